use crate::store::ScoreRecord;

/// The two logical store tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Pre-populated, authoritative dataset. Never written by this crate.
    Curated,
    /// Scores previously computed (and written back) by the engine.
    Opportunistic,
}

impl Tier {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Curated => "curated",
            Tier::Opportunistic => "opportunistic",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of walking the tier chain for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TieredLookupResult {
    HitCurated(ScoreRecord),
    HitOpportunistic(ScoreRecord),
    Miss,
}

impl TieredLookupResult {
    pub fn is_hit(&self) -> bool {
        !matches!(self, TieredLookupResult::Miss)
    }

    /// Tier that answered, if any.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            TieredLookupResult::HitCurated(_) => Some(Tier::Curated),
            TieredLookupResult::HitOpportunistic(_) => Some(Tier::Opportunistic),
            TieredLookupResult::Miss => None,
        }
    }

    pub fn record(&self) -> Option<&ScoreRecord> {
        match self {
            TieredLookupResult::HitCurated(record) | TieredLookupResult::HitOpportunistic(record) => {
                Some(record)
            }
            TieredLookupResult::Miss => None,
        }
    }
}
