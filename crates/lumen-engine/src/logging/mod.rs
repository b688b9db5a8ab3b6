//! Logger initialization over the `log` facade, with `env_logger` as backend.

mod init;

pub use init::{init_logging, LoggingConfig};
