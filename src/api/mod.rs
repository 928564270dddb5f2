pub mod dashboard;
pub mod denial_reason;
pub mod employee;
pub mod health;
pub mod location;
pub mod vacation_request;
