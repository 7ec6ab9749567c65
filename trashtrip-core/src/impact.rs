//! Rank tiers earned through recycling points, and CO₂ comparisons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kilograms of CO₂ a mature tree absorbs per year.
pub const CO2_KG_PER_TREE_YEAR: f64 = 21.77;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Rank reached by accumulating points.
pub enum RankTier {
    /// Below 500 points.
    Seedling,
    /// 500 points and up.
    Sapling,
    /// 2 000 points and up.
    Tree,
    /// 5 000 points and up.
    Forest,
    /// 10 000 points and up.
    GuardianOfEarth,
}

impl RankTier {
    /// Points needed to enter this tier.
    #[must_use]
    pub fn floor(self) -> u64 {
        match self {
            RankTier::Seedling => 0,
            RankTier::Sapling => 500,
            RankTier::Tree => 2_000,
            RankTier::Forest => 5_000,
            RankTier::GuardianOfEarth => 10_000,
        }
    }

    /// Next tier up, if any.
    #[must_use]
    pub fn next(self) -> Option<RankTier> {
        match self {
            RankTier::Seedling => Some(RankTier::Sapling),
            RankTier::Sapling => Some(RankTier::Tree),
            RankTier::Tree => Some(RankTier::Forest),
            RankTier::Forest => Some(RankTier::GuardianOfEarth),
            RankTier::GuardianOfEarth => None,
        }
    }

    /// Tier for a point total.
    #[must_use]
    pub fn for_points(points: u64) -> RankTier {
        [
            RankTier::GuardianOfEarth,
            RankTier::Forest,
            RankTier::Tree,
            RankTier::Sapling,
        ]
        .into_iter()
        .find(|tier| points >= tier.floor())
        .unwrap_or(RankTier::Seedling)
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankTier::Seedling => "Seedling",
            RankTier::Sapling => "Sapling",
            RankTier::Tree => "Tree",
            RankTier::Forest => "Forest",
            RankTier::GuardianOfEarth => "Guardian of Earth",
        };
        write!(formatter, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Where a point total sits within the rank ladder.
pub struct RankInfo {
    /// Current tier.
    pub tier: RankTier,
    /// Points total the info was computed for.
    pub points: u64,
    /// Points at which the next tier starts; `None` at the top.
    pub next_threshold: Option<u64>,
    /// Progress through the current tier band, `0..=100`.
    pub progress_percent: f64,
}

impl RankInfo {
    /// Points still missing for the next tier.
    #[must_use]
    pub fn points_to_next(&self) -> Option<u64> {
        self.next_threshold
            .map(|threshold| threshold.saturating_sub(self.points))
    }
}

/// Rank and in-tier progress for `points`.
#[must_use]
pub fn rank_info(points: u64) -> RankInfo {
    let tier = RankTier::for_points(points);
    let next_threshold = tier.next().map(RankTier::floor);

    let progress_percent = next_threshold.map_or(100.0, |next| {
        let floor = tier.floor();
        #[expect(clippy::cast_precision_loss, reason = "point totals stay far below 2^52")]
        let share = (points - floor) as f64 / (next - floor) as f64;
        (share * 100.0).clamp(0.0, 100.0)
    });

    RankInfo {
        tier,
        points,
        next_threshold,
        progress_percent,
    }
}

/// Number of tree-years that absorb `co2_kg` of CO₂.
#[must_use]
pub fn trees_equivalent(co2_kg: f64) -> f64 {
    if co2_kg.is_finite() && co2_kg > 0.0 {
        co2_kg / CO2_KG_PER_TREE_YEAR
    } else {
        0.0
    }
}
