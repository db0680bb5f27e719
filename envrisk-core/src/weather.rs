//! Weather condition classification
//!
//! Free-text conditions are matched against an ordered rule table. Matching
//! is a case-insensitive substring search and the first matching rule wins,
//! so "orage avec pluie" scores as rain, not storm.

/// Kind of weather a rule recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherKind {
    Rain,
    Storm,
    Snow,
    Fog,
}

/// One row of the rule table
#[derive(Debug)]
pub struct WeatherRule {
    pub kind: WeatherKind,
    pub keywords: &'static [&'static str],
    pub score: f64,
}

/// Sub-score for conditions matching no rule
pub const DEFAULT_WEATHER_SCORE: f64 = 2.0;

/// Rules in priority order
pub const WEATHER_RULES: &[WeatherRule] = &[
    WeatherRule {
        kind: WeatherKind::Rain,
        keywords: &["pluie", "averse", "rain", "shower"],
        score: 7.0,
    },
    WeatherRule {
        kind: WeatherKind::Storm,
        keywords: &["orage", "storm", "thunder"],
        score: 9.0,
    },
    WeatherRule {
        kind: WeatherKind::Snow,
        keywords: &["neige", "snow"],
        score: 5.0,
    },
    WeatherRule {
        kind: WeatherKind::Fog,
        keywords: &["brouillard", "brume", "fog", "mist"],
        score: 4.0,
    },
];

/// Find the first rule whose keywords occur in `conditions`
pub fn match_rule(conditions: &str) -> Option<&'static WeatherRule> {
    let lowered = conditions.to_lowercase();
    WEATHER_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
}

/// Classify conditions into a weather kind, if any rule matches
pub fn classify(conditions: &str) -> Option<WeatherKind> {
    match_rule(conditions).map(|rule| rule.kind)
}

/// Water-category sub-score for the given conditions
pub fn weather_score(conditions: &str) -> f64 {
    match_rule(conditions)
        .map(|rule| rule.score)
        .unwrap_or(DEFAULT_WEATHER_SCORE)
}
