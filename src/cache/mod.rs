//! Two-tier cache-aside lookup: curated dataset first, then the opportunistic cache.

pub mod tiered;
pub mod types;

#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTier;
pub use tiered::{CollectionTier, CuratedLookup, OpportunisticLookup, TieredLookup};
pub use types::{Tier, TieredLookupResult};
