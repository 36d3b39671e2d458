mod handlers;
mod routes;

pub use routes::report_routes;
