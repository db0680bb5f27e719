//! Risk level classification
//!
//! Global invariants enforced:
//! - Classification is a total function of the global score
//! - An undefined global score is `Unknown`, never an error

use serde::{Deserialize, Serialize};

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,     // < 3.5
    Medium,  // 3.5-6.5
    High,    // >= 6.5
    Unknown, // no category scored
}

impl RiskLevel {
    /// Label used by exported tables and downstream report components
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Faible",
            RiskLevel::Medium => "Moyen",
            RiskLevel::High => "Élevé",
            RiskLevel::Unknown => "Inconnu",
        }
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Configurable risk level thresholds on the global score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskLevelThresholds {
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        RiskLevelThresholds {
            medium: 3.5,
            high: 6.5,
        }
    }
}

impl RiskLevelThresholds {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.medium.is_finite() && self.medium > 0.0) {
            anyhow::bail!("risk_levels.medium must be positive (got {})", self.medium);
        }
        if !(self.high.is_finite() && self.high > self.medium) {
            anyhow::bail!(
                "risk_levels.medium ({}) must be less than risk_levels.high ({})",
                self.medium,
                self.high
            );
        }
        Ok(())
    }
}

/// Assign risk level with default thresholds
pub fn assign_risk_level(global_score: Option<f64>) -> RiskLevel {
    assign_risk_level_with_thresholds(global_score, &RiskLevelThresholds::default())
}

/// Assign risk level with custom thresholds
pub fn assign_risk_level_with_thresholds(
    global_score: Option<f64>,
    thresholds: &RiskLevelThresholds,
) -> RiskLevel {
    match global_score {
        None => RiskLevel::Unknown,
        Some(score) if score < thresholds.medium => RiskLevel::Low,
        Some(score) if score < thresholds.high => RiskLevel::Medium,
        Some(_) => RiskLevel::High,
    }
}
