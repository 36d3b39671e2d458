pub mod plans;
pub mod reports;
pub mod teams;
pub mod users;
