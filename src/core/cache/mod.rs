//! Content-addressed payload cache.
//!
//! Entries are keyed by the SHA-256 of a JSON descriptor and stored as
//! `<root>/<kind>-<version>/<params digest>/<key>.<ext>`, with an optional
//! in-memory LRU tier in front of the disk.

mod fs;
mod key;
mod store;

pub use fs::{read_if_exists, write_atomic};
pub use key::{CacheKey, CacheNamespace, digest_json};
pub use store::{CacheError, CacheLookup, CacheOutcome, ContentAddressedCache};
