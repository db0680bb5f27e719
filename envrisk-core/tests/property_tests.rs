//! Property tests for per-site scoring

use envrisk_core::scoring::RiskScoringEngine;
use envrisk_core::{score, RiskLevel, SiteRecord};
use proptest::prelude::*;

fn weather() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec![
        "Pluie".to_string(),
        "Orage".to_string(),
        "Neige".to_string(),
        "Brouillard".to_string(),
        "Ensoleillé".to_string(),
    ]))
}

fn site_record() -> impl Strategy<Value = SiteRecord> {
    (
        (
            prop::option::of(0.0..300.0f64),
            prop::option::of(0.0..300.0f64),
            prop::option::of(0.0..400.0f64),
            prop::option::of(0.0..300.0f64),
            prop::option::of(1.0..=5.0f64),
        ),
        (
            prop::option::of(0.0..100.0f64),
            weather(),
            prop::option::of(0u32..20),
        ),
        (
            prop::option::of(3.0..11.0f64),
            prop::option::of(0.0..10.0f64),
            prop::option::of(0.0..100.0f64),
            prop::option::of(0.0..100.0f64),
        ),
        (
            prop::option::of(0u32..500),
            prop::option::of(0u32..20),
            prop::option::of(0u64..200_000_000),
            prop::option::of(0.0..100.0f64),
            prop::option::of(0.0..100.0f64),
        ),
    )
        .prop_map(
            |(
                (pm25, pm10, no2, o3, air_quality_index),
                (humidity, weather_conditions, nearby_water_points),
                (soil_ph, organic_carbon, clay_pct, sand_pct),
                (
                    nearby_dwellings,
                    nearby_industrial_zones,
                    country_population,
                    water_access_pct,
                    forest_cover_pct,
                ),
            )| SiteRecord {
                name: None,
                pm25,
                pm10,
                no2,
                o3,
                air_quality_index,
                humidity,
                weather_conditions,
                nearby_water_points,
                soil_ph,
                organic_carbon,
                clay_pct,
                sand_pct,
                nearby_dwellings,
                nearby_industrial_zones,
                country_population,
                water_access_pct,
                forest_cover_pct,
            },
        )
}

proptest! {
    #[test]
    fn scoring_is_deterministic(records in prop::collection::vec(site_record(), 0..20)) {
        prop_assert_eq!(score(&records), score(&records));
    }

    #[test]
    fn batch_equals_per_site(records in prop::collection::vec(site_record(), 0..20)) {
        let engine = RiskScoringEngine::default();
        let batch = engine.score(&records);
        prop_assert_eq!(batch.len(), records.len());
        for (record, result) in records.iter().zip(&batch) {
            prop_assert_eq!(&engine.score_site(record), result);
        }
    }

    #[test]
    fn scores_stay_in_range(record in site_record()) {
        let result = RiskScoringEngine::default().score_site(&record);
        for score in [
            result.scores.air,
            result.scores.water,
            result.scores.soil,
            result.scores.human,
            result.global_score,
        ]
        .into_iter()
        .flatten()
        {
            prop_assert!((2.0..=10.0).contains(&score), "score {} out of range", score);
        }
        prop_assert_eq!(result.global_score.is_none(), result.risk_level == RiskLevel::Unknown);
    }

    #[test]
    fn categories_are_independent(record in site_record(), pm25 in prop::option::of(0.0..300.0f64)) {
        let engine = RiskScoringEngine::default();
        let before = engine.score_site(&record);
        let after = engine.score_site(&SiteRecord { pm25, ..record });
        prop_assert_eq!(before.scores.water, after.scores.water);
        prop_assert_eq!(before.scores.soil, after.scores.soil);
        prop_assert_eq!(before.scores.human, after.scores.human);
    }

    #[test]
    fn missing_factor_is_neutral(record in site_record()) {
        // dropping a factor leaves the category as the mean of the rest
        let engine = RiskScoringEngine::default();
        let without_o3 = SiteRecord { o3: None, ..record.clone() };
        let only_o3 = SiteRecord {
            o3: record.o3,
            ..SiteRecord::default()
        };
        let full = engine.score_site(&record).scores.air;
        let rest = engine.score_site(&without_o3).scores.air;
        let o3 = engine.score_site(&only_o3).scores.air;
        let present = [
            record.pm25,
            record.pm10,
            record.no2,
            record.air_quality_index,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count() as f64;

        match (rest, o3) {
            (Some(rest), Some(o3)) => {
                let expected = (rest * present + o3) / (present + 1.0);
                prop_assert!((full.unwrap() - expected).abs() < 1e-9);
            }
            (Some(rest), None) => prop_assert_eq!(full, Some(rest)),
            (None, Some(o3)) => prop_assert_eq!(full, Some(o3)),
            (None, None) => prop_assert_eq!(full, None),
        }
    }
}
