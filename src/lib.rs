pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod stream;
pub mod transport;

pub use error::{ClientError, Result};
