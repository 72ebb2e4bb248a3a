//! Wayfarer Store - Storage ports and adapters
//!
//! This crate defines the storage ports used by the search and feed engines
//! and provides in-memory, PostgreSQL and Redis adapter implementations.

pub mod memory;
pub mod ports;
pub mod postgres;
pub mod redis_store;

pub use memory::{
    MemoryGeoIndex, MemoryKeyValueStore, MemoryPromptStore, MemoryRouteStore, MemoryVoteStore,
};
pub use ports::{
    GeoIndex, GeoQuery, KeyValueStore, NegativeFilter, PromptStore, RouteStore, VoteStore,
};
pub use redis_store::RedisKeyValueStore;
