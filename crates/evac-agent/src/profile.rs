//! Demographic profiles.
//!
//! Each person is drawn once at build time from a fixed population mix.  The
//! numbers below are the model's calibration, not derived quantities:
//!
//! | Category           | Share | Ages  | Mean speed (m/s) |
//! |--------------------|-------|-------|------------------|
//! | Child              | 15 %  | 4–14  | 1.10             |
//! | Adult              | 60 %  | 15–64 | 1.34             |
//! | Older adult        | 20 %  | 65–90 | 0.95             |
//! | Mobility-impaired  |  5 %  | 18–85 | 0.60             |
//!
//! Speeds are normal around the category mean (sd 0.10 m/s) and clamped to
//! [`MIN_SPEED_MPS`, `MAX_SPEED_MPS`].

use std::fmt;

use rand_distr::Normal;

use evac_core::SimRng;

pub const MIN_SPEED_MPS: f64 = 0.3;
pub const MAX_SPEED_MPS: f64 = 2.0;
const SPEED_SD_MPS: f64 = 0.10;

/// Share of older adults who also have reduced mobility.
const OLDER_REDUCED_MOBILITY_P: f64 = 0.3;
const FAMILIARITY_P: f64 = 0.5;

/// Demographic group.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Child,
    Adult,
    OlderAdult,
    MobilityImpaired,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Child,
        Category::Adult,
        Category::OlderAdult,
        Category::MobilityImpaired,
    ];

    fn share(self) -> f64 {
        match self {
            Category::Child => 0.15,
            Category::Adult => 0.60,
            Category::OlderAdult => 0.20,
            Category::MobilityImpaired => 0.05,
        }
    }

    fn ages(self) -> (u8, u8) {
        match self {
            Category::Child => (4, 14),
            Category::Adult => (15, 64),
            Category::OlderAdult => (65, 90),
            Category::MobilityImpaired => (18, 85),
        }
    }

    pub fn mean_speed_mps(self) -> f64 {
        match self {
            Category::Child => 1.10,
            Category::Adult => 1.34,
            Category::OlderAdult => 0.95,
            Category::MobilityImpaired => 0.60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Child => "child",
            Category::Adult => "adult",
            Category::OlderAdult => "older_adult",
            Category::MobilityImpaired => "mobility_impaired",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed attributes of one person.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    pub category:         Category,
    pub age:              u8,
    /// Unobstructed walking speed, m/s.
    pub base_speed_mps:   f64,
    /// 0 = calm, 1 = maximally agitated.
    pub panic:            f64,
    /// Knows the building; earns a bonus for the exit chosen first.
    pub familiar:         bool,
    /// Willingness to follow instructions, 0–1.  Reported, not yet used by
    /// the decision model.
    pub compliance:       f64,
    pub reduced_mobility: bool,
}

impl Profile {
    /// Draw a profile from the population mix.
    pub fn sample(rng: &mut SimRng) -> Self {
        let shares = Category::ALL.map(Category::share);
        let category = rng
            .choose_weighted(&shares)
            .map_or(Category::Adult, |i| Category::ALL[i]);

        let (lo, hi) = category.ages();
        let age = rng.gen_range(lo..=hi);

        let mean = category.mean_speed_mps();
        let base_speed_mps = Normal::new(mean, SPEED_SD_MPS)
            .map(|n| rng.sample(n))
            .unwrap_or(mean)
            .clamp(MIN_SPEED_MPS, MAX_SPEED_MPS);

        let panic = rng.gen_range(0.0..=1.0);
        let familiar = rng.gen_bool(FAMILIARITY_P);
        let compliance = rng.gen_range(0.5..=1.0);
        let reduced_mobility = match category {
            Category::MobilityImpaired => true,
            Category::OlderAdult => rng.gen_bool(OLDER_REDUCED_MOBILITY_P),
            Category::Child | Category::Adult => false,
        };

        Self {
            category,
            age,
            base_speed_mps,
            panic,
            familiar,
            compliance,
            reduced_mobility,
        }
    }

    /// Calm adult walking at the category mean.  Handy for scripted tests.
    pub fn calm_adult() -> Self {
        Self {
            category:         Category::Adult,
            age:              35,
            base_speed_mps:   Category::Adult.mean_speed_mps(),
            panic:            0.0,
            familiar:         false,
            compliance:       1.0,
            reduced_mobility: false,
        }
    }

    /// Whole cells per tick: `max(1, round(speed / speed_per_cell_step))`.
    ///
    /// Rounding (rather than truncating) keeps adults measurably faster than
    /// older adults at the default calibration.
    pub fn movement_rate(&self, speed_per_cell_step: f64) -> u32 {
        let cells = (self.base_speed_mps / speed_per_cell_step).round();
        if cells.is_finite() && cells >= 1.0 {
            cells as u32
        } else {
            1
        }
    }
}
