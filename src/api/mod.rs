pub mod client;
pub mod errors;
pub mod school;

pub use client::ApiClient;
pub use errors::ApiError;
pub use school::{SchoolHealthApi, ScheduleUpdate, SignupDecision};

#[cfg(test)]
pub use school::MockSchoolHealthApi;
