//! WebSocket HTTP handler for the web layer.
//!
//! This module contains only the Axum upgrade handler. The hub itself
//! (coordinator, connections, pumps, message types) lives in the `hub` crate
//! so producers can broadcast without depending on the web layer.

pub mod handler;
