pub mod dashboard;
pub mod vacation;
