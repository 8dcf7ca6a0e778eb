pub mod config;
pub mod logging;

pub use config::{EngineSettings, LoggingSettings, Settings};
pub use logging::init_logging;
