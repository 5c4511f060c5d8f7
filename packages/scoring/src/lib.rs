#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Score calculators for restaurants.
//!
//! A restaurant carries two component scores:
//!
//! - the **inspection score**, the mean of the table score of every
//!   inspection, looked up by `(risk_level, inspection_result)`;
//! - the **safety score**, the mean danger score of every crime within
//!   [`DEFAULT_SAFETY_RADIUS_KM`], looked up by
//!   `(crime_type, if_arrest, location_description)`.
//!
//! The **overall score** combines the two with fixed equal weights. An
//! empty input always yields `0.0`: no evidence is no penalty.

use std::collections::BTreeMap;

use restaurant_safety_restaurant_models::{
    Crime, CrimeRank, Inspection, InspectionScoreEntry, StoredScores,
};
use serde::{Deserialize, Serialize};

/// Weight of the inspection score in the overall score.
pub const INSPECTION_WEIGHT: f64 = 0.5;

/// Weight of the safety score in the overall score.
pub const SAFETY_WEIGHT: f64 = 0.5;

/// Radius around a restaurant whose crimes feed its safety score.
pub const DEFAULT_SAFETY_RADIUS_KM: f64 = 0.5;

/// Arithmetic mean of `values`, or `0.0` when there are none.
#[must_use]
pub fn mean_or_zero<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

/// `0.5 * inspection + 0.5 * safety`.
#[must_use]
pub fn overall_score(inspection_score: f64, safety_score: f64) -> f64 {
    INSPECTION_WEIGHT * inspection_score + SAFETY_WEIGHT * safety_score
}

/// The three scores of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Mean inspection score.
    pub inspection_score: f64,
    /// Mean danger score of nearby crimes.
    pub safety_score: f64,
    /// Weighted combination of the two.
    pub overall_score: f64,
}

impl ScoreCard {
    /// Builds a score card, deriving the overall score.
    #[must_use]
    pub fn new(inspection_score: f64, safety_score: f64) -> Self {
        Self {
            inspection_score,
            safety_score,
            overall_score: overall_score(inspection_score, safety_score),
        }
    }
}

impl From<StoredScores> for ScoreCard {
    fn from(scores: StoredScores) -> Self {
        Self::new(scores.inspection_score, scores.safety_score)
    }
}

/// Lookup from `(risk_level, inspection_result)` to a numeric score.
#[derive(Debug, Clone, Default)]
pub struct InspectionScoreTable {
    scores: BTreeMap<(String, String), f64>,
}

impl InspectionScoreTable {
    /// Builds the table from its rows. Later duplicates win.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = InspectionScoreEntry>,
    {
        let scores = entries
            .into_iter()
            .map(|e| ((e.risk_level, e.inspection_result), e.inspection_score))
            .collect();

        Self { scores }
    }

    /// Score for one `(risk_level, inspection_result)` pair.
    #[must_use]
    pub fn lookup(&self, risk_level: &str, inspection_result: &str) -> Option<f64> {
        self.scores
            .get(&(risk_level.to_string(), inspection_result.to_string()))
            .copied()
    }

    /// Mean score over `inspections`.
    ///
    /// Inspections without a table entry do not take part in the mean,
    /// matching an inner join against the score table.
    #[must_use]
    pub fn score<'a, I>(&self, inspections: I) -> f64
    where
        I: IntoIterator<Item = &'a Inspection>,
    {
        let mut unscored = 0_usize;

        let score = mean_or_zero(inspections.into_iter().filter_map(|inspection| {
            let found = self.lookup(&inspection.risk_level, &inspection.inspection_result);
            if found.is_none() {
                unscored += 1;
            }
            found
        }));

        if unscored > 0 {
            log::debug!("{unscored} inspection(s) had no score table entry");
        }

        score
    }
}

/// Lookup from `(crime_type, if_arrest, location_description)` to a
/// danger score.
#[derive(Debug, Clone, Default)]
pub struct CrimeRankTable {
    ranks: BTreeMap<(String, bool, String), f64>,
}

impl CrimeRankTable {
    /// Builds the table from its rows. Later duplicates win.
    #[must_use]
    pub fn from_ranks<I>(ranks: I) -> Self
    where
        I: IntoIterator<Item = CrimeRank>,
    {
        let ranks = ranks
            .into_iter()
            .map(|r| {
                (
                    (r.crime_type, r.if_arrest, r.location_description),
                    r.danger_score,
                )
            })
            .collect();

        Self { ranks }
    }

    /// Danger score for one crime's key.
    #[must_use]
    pub fn lookup(&self, crime: &Crime) -> Option<f64> {
        self.ranks
            .get(&(
                crime.crime_type.clone(),
                crime.if_arrest,
                crime.location_description.clone(),
            ))
            .copied()
    }

    /// Mean danger score over `crimes`; unranked crimes are skipped.
    #[must_use]
    pub fn score<'a, I>(&self, crimes: I) -> f64
    where
        I: IntoIterator<Item = &'a Crime>,
    {
        mean_or_zero(crimes.into_iter().filter_map(|crime| self.lookup(crime)))
    }
}
