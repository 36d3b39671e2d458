mod handlers;
mod routes;

pub use routes::user_routes;
