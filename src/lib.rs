pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod rpc;
pub mod speech;

pub use error::{Error, Result};
