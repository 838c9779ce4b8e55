pub mod request;
pub mod worker;
