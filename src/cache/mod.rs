//! Cache Module
//!
//! The nil-safe cache contract and its two drivers: an in-process map with
//! lazy TTL expiration and a Redis client.

mod backend;
mod entry;
mod key;
mod memory;
mod remote;
mod value;


// Re-export public types
pub use backend::{CacheBackend, MAX_TTL, NO_EXPIRY};
pub use entry::CacheEntry;
pub use key::{cache_key, slugify};
pub use memory::MemoryCache;
pub use remote::RedisCache;
pub use value::{CacheValue, Caster};

// == Public Constants ==
/// Maximum key length accepted by the HTTP API, in bytes
pub const MAX_KEY_LENGTH: usize = 256;
