//! Adapters implementing the domain ports.

pub mod http_sender;
pub mod in_memory;
pub mod local_bus;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod signature;
pub mod up_api;
