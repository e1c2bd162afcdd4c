//! # CLI Module
//!
//! The user-facing layer of Sporlsync. Each command here wires configuration
//! and credentials into the sync workers, shows progress while a run is in
//! flight, and renders the per-user reports as a table afterwards.
//!
//! ## Commands
//!
//! - [`sync_followed`] - Syncs followed artists and their new releases for
//!   every user with stored credentials
//! - [`sync_playlists`] - Updates the current week's release playlist per user
//! - [`sync_liked`] - Updates the "liked from <year>" playlist per user
//! - [`full_run`] - All three in sequence, the way the scheduler invokes it
//!
//! ## Design
//!
//! The CLI layer owns all terminal output for a run. Workers report per-user
//! outcomes as plain values; a user that failed shows up as a table row with
//! its error, and only configuration-level failures abort the process.

mod run;

pub use run::full_run;
pub use run::sync_followed;
pub use run::sync_liked;
pub use run::sync_playlists;
