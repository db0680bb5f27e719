//! Configuration file support for envrisk
//!
//! Loads threshold overrides (typically country-specific) from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.envriskrc.json` in the project directory
//! 3. `envrisk.config.json` in the project directory
//!
//! All sections are optional and omitted factors keep their defaults. A
//! factor override must give both of its cutoffs.

use crate::factors::FactorThresholds;
use crate::risk::RiskLevelThresholds;
use crate::scoring::RiskScoringEngine;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names checked during discovery, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[".envriskrc.json", "envrisk.config.json"];

/// envrisk configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvRiskConfig {
    /// Free-form label for the threshold set, e.g. the country it targets
    #[serde(default)]
    pub profile: Option<String>,

    /// Factor cutoffs
    #[serde(default)]
    pub thresholds: FactorThresholds,

    /// Global score thresholds for risk levels
    #[serde(default)]
    pub risk_levels: RiskLevelThresholds,
}

/// Validated configuration ready for scoring
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub profile: Option<String>,
    pub thresholds: FactorThresholds,
    pub risk_levels: RiskLevelThresholds,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl EnvRiskConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.risk_levels.validate()?;
        Ok(())
    }

    /// Resolve config into validated form
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;
        Ok(ResolvedConfig {
            profile: self.profile.clone(),
            thresholds: self.thresholds,
            risk_levels: self.risk_levels,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Self {
        ResolvedConfig {
            profile: None,
            thresholds: FactorThresholds::default(),
            risk_levels: RiskLevelThresholds::default(),
            config_path: None,
        }
    }

    /// Scoring engine using these thresholds
    pub fn engine(&self) -> RiskScoringEngine {
        RiskScoringEngine::new(self.thresholds, self.risk_levels)
    }
}

/// Discover and load a config file from the project directory
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(EnvRiskConfig, PathBuf)>> {
    for name in CONFIG_FILE_NAMES {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<EnvRiskConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: EnvRiskConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project directory.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (EnvRiskConfig::default(), None),
        }
    };

    if let Some(ref path) = source_path {
        tracing::debug!(path = %path.display(), "using config file");
    }

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::Cutoffs;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = EnvRiskConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve().expect("default config should resolve");
        assert_eq!(resolved, ResolvedConfig::defaults());
        assert_eq!(resolved.risk_levels.medium, 3.5);
        assert_eq!(resolved.risk_levels.high, 6.5);
        assert_eq!(resolved.thresholds.air.pm25, Cutoffs::new(12.0, 35.0));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: EnvRiskConfig = serde_json::from_str("{}").unwrap();
        config.validate().unwrap();
        assert_eq!(config, EnvRiskConfig::default());
    }

    #[test]
    fn test_parse_country_profile() {
        let json = r#"{
            "profile": "morocco",
            "thresholds": {
                "air": { "pm25": { "lower": 10, "upper": 25 } },
                "water": { "humidity": { "dry": 25, "humid": 85 } },
                "soil": { "ph": { "extreme_acid": 5.0, "acid": 5.8, "alkaline": 8.2, "extreme_alkaline": 9.0 } },
                "human": { "dwellings": { "lower": 20, "upper": 200 } }
            },
            "risk_levels": { "medium": 3.0, "high": 7.0 }
        }"#;
        let config: EnvRiskConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.profile.as_deref(), Some("morocco"));
        assert_eq!(resolved.thresholds.air.pm25, Cutoffs::new(10.0, 25.0));
        // untouched factors keep defaults
        assert_eq!(resolved.thresholds.air.pm10, Cutoffs::new(20.0, 50.0));
        assert_eq!(resolved.thresholds.water.humidity.dry, 25.0);
        assert_eq!(resolved.thresholds.soil.ph.extreme_alkaline, 9.0);
        assert_eq!(resolved.thresholds.human.dwellings, Cutoffs::new(20.0, 200.0));
        assert_eq!(resolved.risk_levels.high, 7.0);
    }

    #[test]
    fn test_partial_risk_levels_use_defaults() {
        let json = r#"{"risk_levels": {"high": 8.0}}"#;
        let config: EnvRiskConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.risk_levels.medium, 3.5);
        assert_eq!(resolved.risk_levels.high, 8.0);
    }

    #[test]
    fn test_reject_unknown_fields() {
        for json in [
            r#"{"unknown_field": true}"#,
            r#"{"thresholds": {"noise": {}}}"#,
            r#"{"thresholds": {"air": {"pm25": {"lower": 1, "upper": 2, "mid": 3}}}}"#,
        ] {
            let result: Result<EnvRiskConfig, _> = serde_json::from_str(json);
            assert!(result.is_err(), "should reject: {}", json);
        }
    }

    #[test]
    fn test_reject_half_cutoff_pair() {
        let json = r#"{"thresholds": {"air": {"pm25": {"lower": 10}}}}"#;
        let result: Result<EnvRiskConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_reject_unordered_cutoffs() {
        let json = r#"{"thresholds": {"soil": {"clay": {"lower": 40, "upper": 20}}}}"#;
        let config: EnvRiskConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unordered_risk_levels() {
        let json = r#"{"risk_levels": {"medium": 7.0, "high": 6.5}}"#;
        let config: EnvRiskConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_discover_rc_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".envriskrc.json");
        fs::write(&config_path, r#"{"profile": "rc"}"#).unwrap();

        let (config, path) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.profile.as_deref(), Some("rc"));
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".envriskrc.json"), r#"{"profile": "rc"}"#).unwrap();
        fs::write(
            dir.path().join("envrisk.config.json"),
            r#"{"profile": "config"}"#,
        )
        .unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(
            config.profile.as_deref(),
            Some("rc"),
            ".envriskrc.json should take priority"
        );
    }

    #[test]
    fn test_no_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_discover_invalid_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("envrisk.config.json"),
            r#"{"risk_levels": {"medium": -1.0}}"#,
        )
        .unwrap();
        assert!(discover_config(dir.path()).is_err());
    }

    #[test]
    fn test_load_and_resolve_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load_and_resolve(dir.path(), None).unwrap();
        assert!(resolved.config_path.is_none());
        assert_eq!(resolved.engine(), RiskScoringEngine::default());
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"risk_levels": {"medium": 4.0}}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(resolved.risk_levels.medium, 4.0);
        assert_eq!(resolved.config_path, Some(config_path));
        assert_eq!(resolved.engine().risk_levels().medium, 4.0);
    }
}
