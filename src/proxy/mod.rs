//! The proxy's placement and replication layer: a consistent-hash ring, a quorum fan-out writer,
//! and the HTTP handlers that expose them.

mod fanout;
mod handler;

pub use fanout::Fanout;
pub use handler::{router, SharedFanout};
