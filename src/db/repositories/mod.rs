mod plan_repository;
mod report_repository;
mod team_repository;
mod user_repository;

pub use plan_repository::PlanRepository;
pub use report_repository::ReportRepository;
pub use team_repository::TeamRepository;
pub use user_repository::UserRepository;
