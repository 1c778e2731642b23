pub mod donation;
pub mod error;
pub mod notification;
