pub mod calendar;
pub mod policy;
pub mod request;
pub mod user;
