//! Site records: one row of measurements per assessed site
//!
//! Every measurement is independently optional. Absence means "not measured"
//! and is never read as zero.

/// Column names of the tabular input contract
pub mod columns {
    pub const NAME: &str = "nom_site";
    pub const PM25: &str = "pm25";
    pub const PM10: &str = "pm10";
    pub const NO2: &str = "no2";
    pub const O3: &str = "o3";
    pub const AIR_QUALITY_INDEX: &str = "indice_qualite_air";
    pub const HUMIDITY: &str = "humidite";
    pub const WEATHER_CONDITIONS: &str = "conditions_meteo";
    pub const WATER_POINTS: &str = "points_eau_proximite";
    pub const SOIL_PH: &str = "ph_sol";
    pub const ORGANIC_CARBON: &str = "carbone_organique";
    pub const CLAY: &str = "argile";
    pub const SAND: &str = "sable";
    pub const DWELLINGS: &str = "habitations_proximite";
    pub const INDUSTRIAL_ZONES: &str = "zones_industrielles_proximite";
    pub const POPULATION: &str = "population_pays";
    pub const WATER_ACCESS: &str = "acces_eau";
    pub const FOREST_COVER: &str = "couverture_forestiere";
}

/// Lowest and highest accepted air quality index values
pub const AIR_QUALITY_INDEX_RANGE: (f64, f64) = (1.0, 5.0);

/// Input measurements for a single site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteRecord {
    pub name: Option<String>,

    // Air (µg/m³)
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    /// 1 (good) to 5 (very poor)
    pub air_quality_index: Option<f64>,

    // Water proxies
    pub humidity: Option<f64>,
    pub weather_conditions: Option<String>,
    pub nearby_water_points: Option<u32>,

    // Soil
    pub soil_ph: Option<f64>,
    pub organic_carbon: Option<f64>,
    pub clay_pct: Option<f64>,
    pub sand_pct: Option<f64>,

    // Human environment
    pub nearby_dwellings: Option<u32>,
    pub nearby_industrial_zones: Option<u32>,
    pub country_population: Option<u64>,
    pub water_access_pct: Option<f64>,
    pub forest_cover_pct: Option<f64>,
}

/// A present field whose value breaks the record's type contract
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub column: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Name for display, falling back to the 1-based position of the site
pub fn display_name(name: Option<&str>, index: usize) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => format!("Site {}", index + 1),
    }
}

impl SiteRecord {
    /// Check the value contract of every present field
    ///
    /// Counts are enforced by their integer types; this covers the float
    /// fields (finite) and the air quality index range.
    pub fn validate(&self) -> Result<(), FieldViolation> {
        let floats = [
            (columns::PM25, self.pm25),
            (columns::PM10, self.pm10),
            (columns::NO2, self.no2),
            (columns::O3, self.o3),
            (columns::AIR_QUALITY_INDEX, self.air_quality_index),
            (columns::HUMIDITY, self.humidity),
            (columns::SOIL_PH, self.soil_ph),
            (columns::ORGANIC_CARBON, self.organic_carbon),
            (columns::CLAY, self.clay_pct),
            (columns::SAND, self.sand_pct),
            (columns::WATER_ACCESS, self.water_access_pct),
            (columns::FOREST_COVER, self.forest_cover_pct),
        ];
        for (column, value) in floats {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(FieldViolation {
                        column,
                        value: v.to_string(),
                        reason: "expected a finite number",
                    });
                }
            }
        }

        if let Some(index) = self.air_quality_index {
            let (min, max) = AIR_QUALITY_INDEX_RANGE;
            if !(min..=max).contains(&index) {
                return Err(FieldViolation {
                    column: columns::AIR_QUALITY_INDEX,
                    value: index.to_string(),
                    reason: "air quality index must be between 1 and 5",
                });
            }
        }

        Ok(())
    }
}
