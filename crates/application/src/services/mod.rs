pub mod backoff;
pub mod lookup_client;
pub mod rate_limiter;
pub mod reputation_cache;

pub use backoff::Backoff;
pub use lookup_client::{LookupClient, LookupPolicy};
pub use rate_limiter::{Cancelled, RateLimiter};
pub use reputation_cache::{CacheEntry, CacheStats, ReputationCache};
