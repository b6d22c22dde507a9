//! In-memory caches for the rewrite table and encoded derivatives.

mod derivative_cache;
mod expiring_cache;
mod rewrite_cache;

pub use derivative_cache::{DEFAULT_DERIVATIVE_TTL, DerivativeCache};
pub use expiring_cache::{ExpiringCache, ExpiryPolicy};
pub use rewrite_cache::{DEFAULT_SLIDING_EXPIRATION, REWRITE_MAP_KEY, RewriteTableCache};
