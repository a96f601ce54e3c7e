pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use traits::{EnableFlag, Notifier, QuoteProvider};
pub use types::*;
