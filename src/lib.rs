//! Local-first wedding planning data: the domain model, a SQLite-backed store
//! for it, and a sync service that pulls a user's weddings from the WeddMate
//! API.

pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod store;
pub mod sync;
