mod client;
mod connection;
mod session;
mod types;

pub use client::{UnixSocketClient, VisionClient};
pub use connection::Connection;
pub use session::Session;
pub use types::{Command, InferResult, Request, Response};
