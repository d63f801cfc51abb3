//! Infos SDK
//!
//! This crate provides the public API for the `infos` module:
//! - `InfosClient` trait
//! - Model types for reminders (`Info`, `NewInfo`, `InfoPatch`)
//! - The filter language (`InfoFilter`, `WhereNode`) and its JSON parser
//! - Error type (`InfosError`)
//!
//! ## Usage
//!
//! ```ignore
//! use infos_sdk::{InfoFilter, InfosClient};
//!
//! let filter = InfoFilter::from_json_str(r#"{"where":{"isComplete":false},"order":"title DESC"}"#)?;
//! let open = client.list_infos(filter).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod errors;
pub mod filter;
pub mod models;

pub use client::InfosClient;
pub use errors::InfosError;
pub use filter::{
    FieldKind, FilterError, FilterValue, InfoField, InfoFilter, OrderKey, Predicate, Projection,
    SortDirection, WhereNode, WhereOp,
};
pub use models::{GeoPoint, Info, InfoPatch, NewInfo};
