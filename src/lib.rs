pub mod config;
pub mod errors;
pub mod proxy;
pub mod replica;
pub mod ring;
pub mod store;
pub mod wal;
pub mod wire;

pub use crate::errors::{ProxyError, StoreError};
pub use crate::ring::Ring;
pub use crate::store::Store;
pub use crate::wal::Wal;
