pub mod client;
pub mod detector;
pub mod discovery;
pub mod sanitizer;

// Re-export main types for convenient access
pub use client::{
    CommandOutcome, ControlClient, LoginManager, PersistentLogin, SessionContext,
    SwitchCommandRequest,
};
pub use detector::{TrailingCommaDetector, TrailingCommaMatch};
pub use discovery::{DiscoveryConfig, collect_source_files, collect_source_files_parallel};
pub use sanitizer::sanitize;
