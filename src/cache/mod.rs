//! In-process caching for the branch and language resolvers.
//!
//! - `CacheStore` is a TTL key/value map with an injectable clock
//! - `CacheLayer` fetches through the store and keeps the last good value per
//!   key so a failing upstream can still be served
//!
//! Nothing is persisted; state is gone when the process exits.

mod clock;
mod keys;
mod layer;
mod store;
mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::CacheKey;
pub use layer::CacheLayer;
pub use store::CacheStore;
pub use traits::{CacheResult, CacheSource, QueryKey};
