//! Entitlement store and business logic for Avatarium.
//!
//! This crate holds the entry store, resolver, mutator and notifier, and
//! defines the ports (persistence, messaging, asset existence, clock) that the
//! infrastructure layer implements. It depends only on `avatarium-types` --
//! never on `avatarium-infra` or any IO crate.

pub mod admin;
pub mod catalog;
pub mod clock;
pub mod exists;
pub mod migration;
pub mod notifier;
pub mod persistence;
pub mod resolver;
pub mod service;
pub mod store;
