//! Spotify Release Sync Library
//!
//! This library keeps a local store of users, their followed artists and new
//! album releases in sync with the Spotify Web API, and maintains weekly and
//! yearly-liked playlists on top of that store. The heart of the crate is a
//! small cooperative scheduler that runs many per-user and per-artist sync
//! units concurrently against a rate-limited API without ever exceeding a
//! fixed in-flight budget.
//!
//! # Modules
//!
//! - `chatbot` - Chat webhook notifications for playlist updates
//! - `cli` - Command handlers, progress feedback and report tables
//! - `config` - Configuration management and environment variables
//! - `management` - Local persistence of users, artists and albums
//! - `spotify` - Spotify Web API client, retry policy and pagination
//! - `tasks` - Bounded concurrent task runner with admission filtering
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `workers` - Domain sync workers (follows, releases, playlists)
//!
//! # Example
//!
//! ```
//! use sporlsync::{config, workers};
//!
//! #[tokio::main]
//! async fn main() -> sporlsync::Res<()> {
//!     config::load_env().await?;
//!     // Run sync workers...
//!     Ok(())
//! }
//! ```

pub mod chatbot;
pub mod cli;
pub mod config;
pub mod management;
pub mod spotify;
pub mod tasks;
pub mod types;
pub mod utils;
pub mod workers;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use sporlsync::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```
/// info!("Starting followed-artists sync...");
/// info!("Fetched {} albums", count);
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
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations.
///
/// # Example
///
/// ```
/// success!("Updated {} artists", count);
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
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Only used at the CLI boundary for
/// unrecoverable errors; workers report per-entity failures instead so one
/// bad entity never kills a batch.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
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
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program
/// termination.
///
/// # Example
///
/// ```
/// warning!("Rate limit approaching: {} requests remaining", remaining);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
