//! Configuration management for the Spotify release sync service.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including Spotify API credentials, chat
//! webhook settings and the scheduler tunables.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf};

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `sporlsync/.env`. This allows users to store
/// configuration securely without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/sporlsync/.env`
/// - macOS: `~/Library/Application Support/sporlsync/.env`
/// - Windows: `%LOCALAPPDATA%/sporlsync/.env`
///
/// # Returns
///
/// Returns `Ok(())` if the environment file is successfully loaded, or an
/// error string if directory creation or file loading fails.
///
/// # Example
///
/// ```
/// use sporlsync::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let mut path = data_dir();
    path.push(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).map_err(|e| e.to_string())?;
    Ok(())
}

/// Returns the base data directory for all locally persisted state.
///
/// All stores (users, artists, albums) and the `.env` file live below this
/// directory. Falls back to the current directory when the platform has no
/// local data directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlsync");
    path
}

/// Returns the Spotify API client ID for authentication.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable which
/// contains the client ID obtained when registering the application with
/// Spotify's developer platform.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret for authentication.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable which
/// contains the client secret obtained when registering the application with
/// Spotify's developer platform. This is used for the refresh-token grant.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable is
/// not set.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET").expect("SPOTIFY_API_AUTH_CLIENT_SECRET must be set")
}

/// Returns the Spotify Web API base URL.
///
/// Retrieves the `SPOTIFY_API_URL` environment variable, defaulting to the
/// public Spotify endpoint. Overridable for testing against a local stub.
///
/// # Example
///
/// ```
/// let api_url = spotify_apiurl(); // "https://api.spotify.com/v1"
/// ```
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the Spotify OAuth token exchange URL.
///
/// Retrieves the `SPOTIFY_API_TOKEN_URL` environment variable, defaulting to
/// the public accounts endpoint. Used for the refresh-token grant whenever a
/// stored access token has expired.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the chat webhook URL for notifications, if configured.
///
/// Retrieves the `CHAT_API_URL` environment variable. When unset, the
/// `--notify` flag is a no-op.
pub fn chat_api_url() -> Option<String> {
    env::var("CHAT_API_URL").ok().filter(|v| !v.is_empty())
}

/// Returns the chat webhook access key, if configured.
///
/// Retrieves the `CHAT_API_KEY` environment variable. Sent as a query
/// parameter on every notification request.
pub fn chat_api_key() -> Option<String> {
    env::var("CHAT_API_KEY").ok().filter(|v| !v.is_empty())
}

/// Returns the concurrency budget for per-user sync tasks.
///
/// Retrieves `SPORLSYNC_USER_TASKS`, defaulting to 5. This bounds how many
/// users are synced at the same time at the outer scheduling level.
pub fn user_tasks_amount() -> usize {
    parse_env_or("SPORLSYNC_USER_TASKS", 5)
}

/// Returns the concurrency budget for per-artist release sync tasks.
///
/// Retrieves `SPORLSYNC_ARTIST_TASKS`, defaulting to 50. Note that the total
/// in-flight work is the product of the user and artist budgets, so keep the
/// combination reasonable for the transport connection pool.
pub fn artist_tasks_amount() -> usize {
    parse_env_or("SPORLSYNC_ARTIST_TASKS", 50)
}

/// Returns the concurrency budget for per-album persistence tasks.
///
/// Retrieves `SPORLSYNC_ALBUM_TASKS`, defaulting to 50. This is the budget of
/// the innermost runner, nested inside each artist sync unit.
pub fn album_tasks_amount() -> usize {
    parse_env_or("SPORLSYNC_ALBUM_TASKS", 50)
}

/// Returns the staleness threshold for artist refresh, in hours.
///
/// Retrieves `SPORLSYNC_ARTIST_REFRESH_HOURS`, defaulting to 4. An artist
/// whose last sync is younger than this is skipped by the admission filter
/// unless `--force` is given.
pub fn artist_refresh_hours() -> i64 {
    parse_env_or("SPORLSYNC_ARTIST_REFRESH_HOURS", 4)
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
