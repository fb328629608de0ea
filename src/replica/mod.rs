//! The replica's HTTP-facing request handler: a thin adapter over [`crate::store::Store`].

mod handler;

pub use handler::{router, SharedStore};
