//! # Spotify Integration Module
//!
//! This module is the only place in the crate that talks to the Spotify Web
//! API. It provides session acquisition on top of stored token material,
//! a retrying request client tuned for Spotify's rate limiting, pagination
//! helpers, and thin wrappers for the endpoints the sync workers use.
//!
//! ## Architecture
//!
//! ```text
//! Workers (follows, releases, playlists)
//!          ↓
//! Endpoint wrappers (artists, playlist)
//!          ↓
//! Pagination helpers (pages)
//!          ↓
//! Retrying client (client::ApiClient)
//!          ↓
//! Transport (client::Transport; reqwest in production, fakes in tests)
//! ```
//!
//! ## Retry and backoff
//!
//! All retry behavior lives in [`client::ApiClient`]:
//!
//! - **429 / 5xx**: retried with a growing delay, honoring the server's
//!   `Retry-After` hint, up to a fixed attempt budget.
//! - **401**: propagated immediately; [`auth::spotify_session`] is the one
//!   layer that refreshes credentials and retries, exactly once.
//! - **Timeouts and undecodable bodies**: retried on the same budget.
//! - **Everything else**: fatal on sight.
//!
//! The pagination helpers and endpoint wrappers deliberately add no retry
//! logic of their own; layering it once keeps the budget meaningful.
//!
//! ## Client caching
//!
//! [`auth::ClientCache`] keeps live clients keyed by access token in an
//! explicit bounded map. A 401 evicts the entry by hand; nothing relies on
//! garbage collection or weak references to invalidate dead clients.
//!
//! ## Endpoint coverage
//!
//! - `GET /me` - session probe and profile data
//! - `GET /me/following` - followed artists (cursor pages)
//! - `GET /me/following/contains` - unfollow double-check
//! - `GET /me/tracks` - saved tracks for the yearly playlist
//! - `GET /artists/{id}/albums` - releases, windowed by the caller
//! - `GET /albums/{id}`, `GET /albums/{id}/tracks`, `GET /tracks/{id}`
//! - `GET /users/{id}/playlists`, `GET /playlists/{id}/tracks`
//! - `POST /users/{id}/playlists`, `POST /playlists/{id}/tracks`
//! - `POST <accounts>/api/token` - refresh-token grant (plain reqwest,
//!   outside the retry client)

pub mod artists;
pub mod auth;
pub mod client;
pub mod pages;
pub mod playlist;
