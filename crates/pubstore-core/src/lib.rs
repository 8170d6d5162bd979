//! Pubstore Core - Common infrastructure for the PubMed ingest tools
//!
//! Logging, progress reporting, graceful shutdown, and loading of
//! source documents from disk.

pub mod logging;
pub mod progress;
pub mod shutdown;
pub mod source;

// Re-exports for convenience
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown, shutdown_flag};
pub use source::{SourceDocument, discover_sources};
