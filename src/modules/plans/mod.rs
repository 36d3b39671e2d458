mod handlers;
mod routes;

pub use routes::plan_routes;
