pub mod http;
pub mod telegram;
pub mod webhook;
