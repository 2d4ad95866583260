//! Observer API server for replication animation data.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Replication endpoints** for listing discovered replications,
//!   reading manifests, and switching the active replication
//! - **Shared document endpoints** for the model layout and visual
//!   configuration common to every replication
//! - **Entity endpoints** for paths and interpolated positions
//! - **Statistics endpoints** for summaries, interpolated values, and
//!   time windows
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The server wraps one [`AnimationDataSet`] behind a
//! [`tokio::sync::RwLock`]. Queries share the read lock. Activation
//! holds the write lock until both caches are reloaded.
//!
//! [`AnimationDataSet`]: animation_core::AnimationDataSet

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::{Activation, AppState, SharedDataSet};
