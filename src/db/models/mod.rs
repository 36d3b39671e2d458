mod assessment_plan;
mod assessment_report;
mod team;
mod user;

pub use assessment_plan::*;
pub use assessment_report::*;
pub use team::*;
pub use user::*;
