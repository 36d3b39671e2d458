mod handlers;
mod routes;

pub use routes::team_routes;
