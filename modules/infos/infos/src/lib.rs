//! Infos Module
//!
//! Reminder ("Info") management with a REST API, pluggable storage and
//! address geocoding on write.
//!
//! ## Public API
//!
//! The public API is defined in the `infos-sdk` crate and re-exported here:
//! - `InfosClient` - trait for in-process consumers
//! - `Info`, `NewInfo`, `InfoPatch` - data models
//! - `InfoFilter`, `WhereNode` - the filter language
//! - `InfosError` - error types
//!
//! Wire it up through [`InfosModule`], which builds the service from
//! [`config::InfosConfig`] and exposes the router and the local client.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// === PUBLIC API (from SDK) ===
pub use infos_sdk::{
    Info, InfoFilter, InfoPatch, InfosClient, InfosError, NewInfo, WhereNode,
};

// === MODULE DEFINITION ===
pub mod module;
pub use module::InfosModule;

// === INTERNAL MODULES ===
// Exposed for integration tests; consumers should stick to the SDK types.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
