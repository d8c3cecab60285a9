//! S3Browser core domain logic
//!
//! This crate contains:
//! - Bucket-rooted path resolution
//! - Listing entries and display rows
//! - Browsing session record
//! - Intents, context menu and intent dispatch
//! - Configuration
//! - Error types

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod intent;
pub mod listing;
pub mod path;
pub mod prompt;
pub mod session;

pub use config::{AppConfig, LoggingConfig, PreviewConfig, TransferConfig};
pub use dispatcher::{is_recursive, ActionDispatcher, Outcome, Transition};
pub use error::AppError;
pub use intent::{context_menu, Intent, MenuItem};
pub use listing::{
    build_listing, display_size, display_timestamp, sort_entries, Entry, Row, PARENT_NAME,
    PLACEHOLDER,
};
pub use path::{PathResolver, VirtualPath};
pub use prompt::{Prompter, ScriptedPrompter};
pub use session::Session;
