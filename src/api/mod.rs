pub mod dashboard;
pub mod export;
pub mod query;
pub mod session;
