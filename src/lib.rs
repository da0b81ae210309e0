pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod http;
pub mod serialize;
pub mod store;
