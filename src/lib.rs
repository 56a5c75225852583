//! Spotify Release Bot Library
//!
//! Tracks a curated list of artists, polls Spotify for their releases and
//! keeps a target playlist filled with new tracks without ever adding a
//! duplicate. Besides the incremental scan it can add an artist's full
//! catalog, reconcile a playlist against every tracked artist and shuffle a
//! playlist in place.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy and retry classification
//! - `filter` - Partial release dates, release types and date ranges
//! - `management` - Token lifecycle, persistence, scanning and reconciliation
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client (transport, retry, pagination)
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers, shuffling and small helpers
//!
//! # Example
//!
//! ```
//! use releasebot::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> releasebot::Res<()> {
//!     config::load_env().await?;
//!     cli::scan().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::Error;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the library reports an [`Error`], which keeps
/// the retry classification and the user-facing message in one place.
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Scanning {} artist(s)...", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Added {} track(s)", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the CLI layer uses this macro. Library code returns an [`Error`]
/// instead so callers such as the 24/7 bot can keep running.
///
/// # Example
///
/// ```
/// error!("No playlist selected");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues such as a retried request or an artist that
/// could not be scanned.
///
/// # Example
///
/// ```
/// warning!("Rate limited, retrying in {}s", secs);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
