//! Shared domain types for Avatarium.
//!
//! This crate contains the value types used across the avatar entitlement
//! store: avatar and user identifiers, the per-user grant entry, its durable
//! record shape, configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod avatar;
pub mod config;
pub mod entry;
pub mod error;
pub mod record;
pub mod user;
