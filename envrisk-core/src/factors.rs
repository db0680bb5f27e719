//! Factor thresholds and per-factor sub-scores
//!
//! Each present measurement maps to a small discrete sub-score through fixed
//! bands. Only the cutoffs are configurable; the sub-score values of every
//! band are part of the scoring model.
//!
//! Comparisons are strict and must stay exactly as written: "below" factors
//! use `<` (a value equal to a cutoff falls in the upper band) and "above"
//! factors use `>` (a value equal to a cutoff falls in the lower band).

use serde::{Deserialize, Serialize};

/// A pair of cutoffs splitting a measurement into three bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cutoffs {
    pub lower: f64,
    pub upper: f64,
}

/// Which of the three bands a value falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Low,
    Middle,
    High,
}

impl Cutoffs {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Cutoffs { lower, upper }
    }

    /// Band by strict `<`: `[.., lower)`, `[lower, upper)`, `[upper, ..]`
    pub fn band_below(&self, value: f64) -> Band {
        if value < self.lower {
            Band::Low
        } else if value < self.upper {
            Band::Middle
        } else {
            Band::High
        }
    }

    /// Band by strict `>`: `[.., lower]`, `(lower, upper]`, `(upper, ..]`
    pub fn band_above(&self, value: f64) -> Band {
        if value > self.upper {
            Band::High
        } else if value > self.lower {
            Band::Middle
        } else {
            Band::Low
        }
    }

    fn is_ordered(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper
    }
}

/// Humidity bounds: too dry below `dry`, too humid above `humid`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HumidityCutoffs {
    pub dry: f64,
    pub humid: f64,
}

/// Soil pH bounds, from most acidic to most alkaline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhCutoffs {
    pub extreme_acid: f64,
    pub acid: f64,
    pub alkaline: f64,
    pub extreme_alkaline: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirThresholds {
    pub pm25: Cutoffs,
    pub pm10: Cutoffs,
    pub no2: Cutoffs,
    pub o3: Cutoffs,
}

impl Default for AirThresholds {
    fn default() -> Self {
        AirThresholds {
            pm25: Cutoffs::new(12.0, 35.0),
            pm10: Cutoffs::new(20.0, 50.0),
            no2: Cutoffs::new(40.0, 200.0),
            o3: Cutoffs::new(100.0, 180.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaterThresholds {
    pub humidity: HumidityCutoffs,
    pub water_points: Cutoffs,
}

impl Default for WaterThresholds {
    fn default() -> Self {
        WaterThresholds {
            humidity: HumidityCutoffs {
                dry: 30.0,
                humid: 80.0,
            },
            water_points: Cutoffs::new(0.0, 5.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoilThresholds {
    pub ph: PhCutoffs,
    pub organic_carbon: Cutoffs,
    pub clay: Cutoffs,
    pub sand: Cutoffs,
}

impl Default for SoilThresholds {
    fn default() -> Self {
        SoilThresholds {
            ph: PhCutoffs {
                extreme_acid: 5.5,
                acid: 6.0,
                alkaline: 8.0,
                extreme_alkaline: 8.5,
            },
            organic_carbon: Cutoffs::new(1.0, 2.0),
            clay: Cutoffs::new(20.0, 40.0),
            sand: Cutoffs::new(40.0, 70.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HumanThresholds {
    pub dwellings: Cutoffs,
    pub industrial_zones: Cutoffs,
    pub population: Cutoffs,
    pub water_access: Cutoffs,
    pub forest_cover: Cutoffs,
}

impl Default for HumanThresholds {
    fn default() -> Self {
        HumanThresholds {
            dwellings: Cutoffs::new(10.0, 100.0),
            industrial_zones: Cutoffs::new(0.0, 5.0),
            population: Cutoffs::new(10_000_000.0, 50_000_000.0),
            water_access: Cutoffs::new(50.0, 80.0),
            forest_cover: Cutoffs::new(10.0, 30.0),
        }
    }
}

/// Cutoffs for every banded factor, grouped by category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactorThresholds {
    pub air: AirThresholds,
    pub water: WaterThresholds,
    pub soil: SoilThresholds,
    pub human: HumanThresholds,
}

impl FactorThresholds {
    /// Check that every cutoff pair is finite and strictly increasing
    pub fn validate(&self) -> anyhow::Result<()> {
        let pairs = [
            ("air.pm25", self.air.pm25),
            ("air.pm10", self.air.pm10),
            ("air.no2", self.air.no2),
            ("air.o3", self.air.o3),
            ("water.water_points", self.water.water_points),
            ("soil.organic_carbon", self.soil.organic_carbon),
            ("soil.clay", self.soil.clay),
            ("soil.sand", self.soil.sand),
            ("human.dwellings", self.human.dwellings),
            ("human.industrial_zones", self.human.industrial_zones),
            ("human.population", self.human.population),
            ("human.water_access", self.human.water_access),
            ("human.forest_cover", self.human.forest_cover),
        ];
        for (name, cutoffs) in pairs {
            if !cutoffs.is_ordered() {
                anyhow::bail!(
                    "thresholds.{}: lower ({}) must be less than upper ({})",
                    name,
                    cutoffs.lower,
                    cutoffs.upper
                );
            }
        }

        let h = self.water.humidity;
        if !(h.dry.is_finite() && h.humid.is_finite() && h.dry < h.humid) {
            anyhow::bail!(
                "thresholds.water.humidity: dry ({}) must be less than humid ({})",
                h.dry,
                h.humid
            );
        }

        let ph = self.soil.ph;
        let ordered = [ph.extreme_acid, ph.acid, ph.alkaline, ph.extreme_alkaline];
        let monotonic = ph.extreme_acid < ph.acid
            && ph.acid <= ph.alkaline
            && ph.alkaline < ph.extreme_alkaline;
        if ordered.iter().any(|v| !v.is_finite()) || !monotonic {
            anyhow::bail!(
                "thresholds.soil.ph must satisfy \
                 extreme_acid < acid <= alkaline < extreme_alkaline (got {}, {}, {}, {})",
                ph.extreme_acid,
                ph.acid,
                ph.alkaline,
                ph.extreme_alkaline
            );
        }

        Ok(())
    }
}

/// Pollutant concentration: 2 / 5 / 10
pub fn pollutant_score(value: f64, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_below(value) {
        Band::Low => 2.0,
        Band::Middle => 5.0,
        Band::High => 10.0,
    }
}

/// Air quality index on the 1-5 scale, scaled linearly to 2-10
pub fn air_quality_index_score(index: f64) -> f64 {
    index * 2.0
}

/// Too dry is riskier than too humid
pub fn humidity_score(humidity: f64, cutoffs: &HumidityCutoffs) -> f64 {
    if humidity < cutoffs.dry {
        8.0
    } else if humidity > cutoffs.humid {
        6.0
    } else {
        3.0
    }
}

pub fn water_points_score(count: u32, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_above(f64::from(count)) {
        Band::High => 8.0,
        Band::Middle => 5.0,
        Band::Low => 2.0,
    }
}

pub fn soil_ph_score(ph: f64, cutoffs: &PhCutoffs) -> f64 {
    if ph < cutoffs.extreme_acid || ph > cutoffs.extreme_alkaline {
        8.0
    } else if ph < cutoffs.acid || ph > cutoffs.alkaline {
        5.0
    } else {
        2.0
    }
}

/// Poor soils (little organic carbon) score highest
pub fn organic_carbon_score(pct: f64, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_below(pct) {
        Band::Low => 8.0,
        Band::Middle => 5.0,
        Band::High => 2.0,
    }
}

pub fn clay_score(pct: f64, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_above(pct) {
        Band::High => 7.0,
        Band::Middle => 4.0,
        Band::Low => 2.0,
    }
}

pub fn sand_score(pct: f64, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_above(pct) {
        Band::High => 6.0,
        Band::Middle => 3.0,
        Band::Low => 2.0,
    }
}

pub fn dwellings_score(count: u32, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_above(f64::from(count)) {
        Band::High => 9.0,
        Band::Middle => 6.0,
        Band::Low => 3.0,
    }
}

pub fn industrial_zones_score(count: u32, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_above(f64::from(count)) {
        Band::High => 10.0,
        Band::Middle => 7.0,
        Band::Low => 2.0,
    }
}

pub fn population_score(population: u64, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_above(population as f64) {
        Band::High => 7.0,
        Band::Middle => 5.0,
        Band::Low => 3.0,
    }
}

/// Low access to drinking water scores highest
pub fn water_access_score(pct: f64, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_below(pct) {
        Band::Low => 9.0,
        Band::Middle => 6.0,
        Band::High => 3.0,
    }
}

/// Sparse forest cover scores highest
pub fn forest_cover_score(pct: f64, cutoffs: &Cutoffs) -> f64 {
    match cutoffs.band_below(pct) {
        Band::Low => 8.0,
        Band::Middle => 5.0,
        Band::High => 2.0,
    }
}
