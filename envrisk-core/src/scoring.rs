//! Site risk scoring
//!
//! Maps each site's optional measurements to four category scores, a global
//! score and a risk level.
//!
//! Global invariants enforced:
//! - A category score is the plain mean of its present factor sub-scores
//! - Absent factors are excluded, never counted as zero
//! - Undefined categories are excluded from the global mean
//! - Sites are scored independently; output order equals input order

use crate::factors::{self, FactorThresholds};
use crate::record::SiteRecord;
use crate::risk::{self, RiskLevel, RiskLevelThresholds};
use crate::weather;
use rayon::prelude::*;
use serde::Serialize;

/// Scoring category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Air,
    Water,
    Soil,
    Human,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Air,
        Category::Water,
        Category::Soil,
        Category::Human,
    ];

    /// Label used in exported tables and action plans
    pub fn label(&self) -> &'static str {
        match self {
            Category::Air => "Air",
            Category::Water => "Eau",
            Category::Soil => "Sol",
            Category::Human => "Humain",
        }
    }

    /// Output column holding this category's score
    pub fn score_column(&self) -> &'static str {
        match self {
            Category::Air => "score_air",
            Category::Water => "score_eau",
            Category::Soil => "score_sol",
            Category::Human => "score_humain",
        }
    }
}

/// Running sum and count of present factor sub-scores
#[derive(Debug, Default, Clone, Copy)]
struct FactorAccumulator {
    sum: f64,
    count: u32,
}

impl FactorAccumulator {
    /// Add the sub-score of a factor if its input is present
    fn add<T>(&mut self, input: Option<T>, sub_score: impl FnOnce(T) -> f64) {
        if let Some(value) = input {
            self.sum += sub_score(value);
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

/// Per-category scores for one site; `None` means no factor was present
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryScores {
    #[serde(rename = "score_air")]
    pub air: Option<f64>,
    #[serde(rename = "score_eau")]
    pub water: Option<f64>,
    #[serde(rename = "score_sol")]
    pub soil: Option<f64>,
    #[serde(rename = "score_humain")]
    pub human: Option<f64>,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> Option<f64> {
        match category {
            Category::Air => self.air,
            Category::Water => self.water,
            Category::Soil => self.soil,
            Category::Human => self.human,
        }
    }

    /// Mean of the defined category scores
    pub fn global(&self) -> Option<f64> {
        let mut acc = FactorAccumulator::default();
        for category in Category::ALL {
            acc.add(self.get(category), |score| score);
        }
        acc.mean()
    }
}

/// Scoring outcome for one site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRiskResult {
    #[serde(rename = "nom_site")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub scores: CategoryScores,
    #[serde(rename = "score_global")]
    pub global_score: Option<f64>,
    #[serde(rename = "niveau_risque")]
    pub risk_level: RiskLevel,
}

/// Deterministic risk scoring engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskScoringEngine {
    thresholds: FactorThresholds,
    risk_levels: RiskLevelThresholds,
}

impl RiskScoringEngine {
    pub fn new(thresholds: FactorThresholds, risk_levels: RiskLevelThresholds) -> Self {
        RiskScoringEngine {
            thresholds,
            risk_levels,
        }
    }

    pub fn risk_levels(&self) -> &RiskLevelThresholds {
        &self.risk_levels
    }

    /// Score a batch of sites, one result per record in input order
    pub fn score(&self, records: &[SiteRecord]) -> Vec<SiteRiskResult> {
        let results: Vec<SiteRiskResult> =
            records.par_iter().map(|r| self.score_site(r)).collect();
        tracing::debug!(sites = results.len(), "scored site batch");
        results
    }

    /// Score a single site
    pub fn score_site(&self, record: &SiteRecord) -> SiteRiskResult {
        let scores = self.category_scores(record);
        let global_score = scores.global();
        SiteRiskResult {
            name: record.name.clone(),
            scores,
            global_score,
            risk_level: risk::assign_risk_level_with_thresholds(global_score, &self.risk_levels),
        }
    }

    pub fn category_scores(&self, record: &SiteRecord) -> CategoryScores {
        CategoryScores {
            air: self.air_score(record),
            water: self.water_score(record),
            soil: self.soil_score(record),
            human: self.human_score(record),
        }
    }

    pub fn air_score(&self, record: &SiteRecord) -> Option<f64> {
        let t = &self.thresholds.air;
        let mut acc = FactorAccumulator::default();
        acc.add(record.pm25, |v| factors::pollutant_score(v, &t.pm25));
        acc.add(record.pm10, |v| factors::pollutant_score(v, &t.pm10));
        acc.add(record.no2, |v| factors::pollutant_score(v, &t.no2));
        acc.add(record.o3, |v| factors::pollutant_score(v, &t.o3));
        acc.add(record.air_quality_index, factors::air_quality_index_score);
        acc.mean()
    }

    pub fn water_score(&self, record: &SiteRecord) -> Option<f64> {
        let t = &self.thresholds.water;
        let mut acc = FactorAccumulator::default();
        acc.add(record.humidity, |v| factors::humidity_score(v, &t.humidity));
        acc.add(record.weather_conditions.as_deref(), weather::weather_score);
        acc.add(record.nearby_water_points, |v| {
            factors::water_points_score(v, &t.water_points)
        });
        acc.mean()
    }

    pub fn soil_score(&self, record: &SiteRecord) -> Option<f64> {
        let t = &self.thresholds.soil;
        let mut acc = FactorAccumulator::default();
        acc.add(record.soil_ph, |v| factors::soil_ph_score(v, &t.ph));
        acc.add(record.organic_carbon, |v| {
            factors::organic_carbon_score(v, &t.organic_carbon)
        });
        acc.add(record.clay_pct, |v| factors::clay_score(v, &t.clay));
        acc.add(record.sand_pct, |v| factors::sand_score(v, &t.sand));
        acc.mean()
    }

    pub fn human_score(&self, record: &SiteRecord) -> Option<f64> {
        let t = &self.thresholds.human;
        let mut acc = FactorAccumulator::default();
        acc.add(record.nearby_dwellings, |v| {
            factors::dwellings_score(v, &t.dwellings)
        });
        acc.add(record.nearby_industrial_zones, |v| {
            factors::industrial_zones_score(v, &t.industrial_zones)
        });
        acc.add(record.country_population, |v| {
            factors::population_score(v, &t.population)
        });
        acc.add(record.water_access_pct, |v| {
            factors::water_access_score(v, &t.water_access)
        });
        acc.add(record.forest_cover_pct, |v| {
            factors::forest_cover_score(v, &t.forest_cover)
        });
        acc.mean()
    }
}

/// Score a batch of sites with default thresholds
pub fn score(records: &[SiteRecord]) -> Vec<SiteRiskResult> {
    RiskScoringEngine::default().score(records)
}
