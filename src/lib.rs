pub mod audio;
pub mod config;
pub mod decoder;
pub mod error;
pub mod export;
pub mod kernel;
pub mod outputs;
pub mod timeline;

// Engine entry points: configuration, the error type and the reactor.
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use kernel::reactor::Reactor;
