//! imgsuite Core Library
//!
//! Domain models, configuration and the headless application state shared by the
//! API client and the command-line front end. Nothing in this crate performs I/O
//! against the backend.

pub mod config;
pub mod error;
pub mod models;
pub mod state;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ConfigError, ParseError};
pub use models::{
    EditOperation, ImageMeta, ImagePage, ImageStatus, ImageUpload, OutputFormat, Variant,
};
pub use state::{Action, AppState, Control, DispatchResult, Effect, Store};
