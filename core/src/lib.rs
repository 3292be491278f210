//! Client core for the todo gateway.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps the client's
//! in-memory todo list in step with server responses.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit. The host plugs in a `Transport`.
//! - `sync::reduce` is a pure reducer over `TodoState`; `TodoSession` is the
//!   owned container that drives it from request outcomes.
//! - DTOs are defined independently from the gateway crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod edit;
pub mod error;
pub mod http;
pub mod sync;
pub mod types;

pub use client::TodoClient;
pub use edit::{Draft, EditState};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use sync::{reduce, Action, TodoSession, TodoState, Transport};
pub use types::{CreateTodo, DeleteTodo, Patch, Todo, UpdateTodo};
