//! Typed request bodies for the admin endpoints.
//!
//! Deserialization checks shape and types; the `validate` methods check the
//! content rules serde cannot express.

pub(crate) mod notification;
