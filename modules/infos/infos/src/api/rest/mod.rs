//! REST surface of the infos module.
//!
//! - `dto.rs` - wire types and request-body validation
//! - `query.rs` - `filter`/`where` query decoding and the key guard
//! - `problem.rs` / `error.rs` - RFC 9457 responses and domain error mapping
//! - `handlers.rs` / `routes.rs` - axum handlers and the route table

pub mod dto;
pub mod error;
pub mod handlers;
pub mod problem;
pub mod query;
pub mod routes;
