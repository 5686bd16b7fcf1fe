//! Named cache partitions for intercepted requests
//!
//! A partition is a key-value store from request identity (method + URL) to a
//! stored response. Partitions are opened by name, created on first open, and
//! live until the whole storage is dropped; nothing in this module expires or
//! evicts entries.

mod store;

pub use store::{
    CachePartition, CacheStats, CacheStorage, MemoryPartition, RequestKey, StoredResponse,
};
