//! # Photo Wall
//!
//! A small self-hosted photo gallery backend. Clients upload images over
//! HTTP; every accepted upload is normalized to a single storage format
//! (JPEG, quality 90) and recorded in a SQLite catalog, which the CRUD
//! endpoints serve back as JSON.
//!
//! # Architecture: The Upload Pipeline
//!
//! The one interesting path in this service is the upload pipeline —
//! everything else is conventional CRUD:
//!
//! ```text
//! Validate → StageTemp → Convert → CleanupTemp → Stat → Persist
//! ```
//!
//! Each stage failure is terminal for the request (no retries), and the
//! record is only created after the converted file is safely on disk, so a
//! successful record always points at a real file. The converse is allowed:
//! a failure between conversion and persist leaves an orphaned file, which
//! is tolerated rather than reconciled.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`codec`] | image decode (auto-detect + extension fallback) and normalized JPEG encode |
//! | [`store`] | file persistence rooted at the uploads directory |
//! | [`repo`] | SQLite catalog of photo records |
//! | [`pipeline`] | the upload state machine orchestrating the three above |
//! | [`auth`] | login credential check behind a swappable trait |
//! | [`api`] | axum routes, handlers, and error → status mapping |
//! | [`config`] | defaults ← `config.toml` ← flags/`PORT` |
//!
//! # Design Decisions
//!
//! ## One Storage Format
//!
//! Uploads arrive as JPEG, PNG, GIF, WebP (and whatever a lying extension
//! hides). Re-encoding everything to JPEG q90 on ingest means the gallery
//! serves exactly one format, corrupt files are rejected at the door, and
//! the stored bytes never depend on what a browser happened to send.
//!
//! ## Blocking I/O On The Handler Task
//!
//! File writes, decode/encode, and SQLite calls all run synchronously on
//! the request's task. This is a low-volume, single-process admin tool;
//! per-request latency is dominated by the re-encode either way, and the
//! absence of internal concurrency keeps the pipeline a straight-line
//! function.
//!
//! ## No Sessions
//!
//! `/api/login` verifies a credential pair and returns a verdict — it
//! issues nothing, and no other endpoint checks anything. The
//! [`auth::Authenticator`] trait is the seam where a real scheme would go.

pub mod api;
pub mod auth;
pub mod codec;
pub mod config;
pub mod pipeline;
pub mod repo;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
