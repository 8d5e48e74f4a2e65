pub mod config;
pub mod error;
pub mod time;

pub use config::Config;
pub use error::{DispatchError, Result};
