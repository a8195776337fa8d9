//! Synchronization with the WeddMate API.
//!
//! The API is the authority for the weddings a user owns. A refresh fetches
//! `/api/users/myWeddings` and merges the result into the local store: each
//! record is inserted or updated by id, the newer `updated_at` wins, and
//! records that only exist locally are kept.

pub mod client;
pub mod error;
pub mod service;

pub use client::{decode_weddings, WeddingClient, DEFAULT_BASE_URL};
pub use error::SyncError;
pub use service::{RetryPolicy, SyncService};
