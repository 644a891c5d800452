//! Variable back tier selection

use shared::models::{BackTier, TierBasis};

/// Tier that applies at cumulative `value`
///
/// `tiers` are sorted by threshold (enforced on save). Picks the greatest
/// threshold `<= value`; `None` below the first threshold means the base
/// rate applies. Tiers missing the threshold for `basis` never match.
pub fn select_tier(tiers: &[BackTier], basis: TierBasis, value: i64) -> Option<&BackTier> {
    tiers
        .iter()
        .filter(|t| t.threshold(basis).is_some_and(|min| min <= value))
        .max_by_key(|t| t.threshold(basis))
}
