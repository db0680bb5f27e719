//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Undefined scores render as `N/A` (text), `null` (JSON) or an empty cell (CSV)
//! - Byte-for-byte identical output across runs

use crate::recommend::SiteRecommendations;
use crate::record;
use crate::scoring::{Category, SiteRiskResult};
use serde::Serialize;

/// One output row: a scored site, optionally with recommendations
#[derive(Debug, Clone, Serialize)]
pub struct AssessedSite {
    /// Position of the site in the input
    #[serde(skip)]
    pub index: usize,
    #[serde(flatten)]
    pub result: SiteRiskResult,
    #[serde(flatten)]
    pub recommendations: Option<SiteRecommendations>,
}

impl AssessedSite {
    pub fn display_name(&self) -> String {
        record::display_name(self.result.name.as_deref(), self.index)
    }
}

/// Pair results with optional recommendations, keeping input positions
pub fn assemble(
    results: Vec<SiteRiskResult>,
    recommendations: Option<Vec<SiteRecommendations>>,
) -> Vec<AssessedSite> {
    let mut recs = recommendations.map(|r| r.into_iter());
    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| AssessedSite {
            index,
            result,
            recommendations: recs.as_mut().and_then(|it| it.next()),
        })
        .collect()
}

/// Sort sites for display: global score descending, undefined last, then input order
pub fn sort_sites(mut sites: Vec<AssessedSite>) -> Vec<AssessedSite> {
    sites.sort_by(|a, b| {
        let by_score = match (a.result.global_score, b.result.global_score) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        by_score.then_with(|| a.index.cmp(&b.index))
    });
    sites
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Render sites as an aligned text table
pub fn render_text(sites: &[AssessedSite]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<24} {:>6} {:>6} {:>6} {:>6} {:>7} {}\n",
        "SITE", "AIR", "WATER", "SOIL", "HUMAN", "GLOBAL", "LEVEL"
    ));

    for site in sites {
        let scores = &site.result.scores;
        output.push_str(&format!(
            "{:<24} {:>6} {:>6} {:>6} {:>6} {:>7} {}\n",
            truncate_or_pad(&site.display_name(), 24),
            format_score(scores.air),
            format_score(scores.water),
            format_score(scores.soil),
            format_score(scores.human),
            format_score(site.result.global_score),
            site.result.risk_level.label(),
        ));

        if let Some(ref recs) = site.recommendations {
            if let Some(priority) = recs.priority {
                output.push_str(&format!("    priorité: {}\n", priority.label()));
            }
            for category in Category::ALL {
                for line in recs.for_category(category) {
                    output.push_str(&format!("    [{}] {}\n", category.label(), line));
                }
            }
            for line in &recs.general {
                output.push_str(&format!("    [Général] {}\n", line));
            }
        }
    }

    output
}

/// One summary line per site
pub fn render_summary(sites: &[AssessedSite]) -> String {
    sites
        .iter()
        .map(|site| {
            format!(
                "- {}: risk level {} (score: {})\n",
                site.display_name(),
                site.result.risk_level.label(),
                format_score(site.result.global_score)
            )
        })
        .collect()
}

/// Render sites as JSON output
pub fn render_json(sites: &[AssessedSite]) -> String {
    serde_json::to_string_pretty(sites).unwrap_or_else(|_| "[]".to_string())
}

/// Column order of CSV output
pub fn csv_headers(with_recommendations: bool) -> Vec<&'static str> {
    let mut headers = vec!["nom_site"];
    headers.extend(Category::ALL.iter().map(|c| c.score_column()));
    headers.extend(["score_global", "niveau_risque"]);
    if with_recommendations {
        headers.extend([
            "recommandations_air",
            "recommandations_eau",
            "recommandations_sol",
            "recommandations_humain",
            "recommandations_generales",
            "priorite_action",
        ]);
    }
    headers
}

/// Write sites as CSV; undefined scores are empty cells
pub fn write_csv<W: std::io::Write>(sites: &[AssessedSite], writer: W) -> csv::Result<()> {
    let with_recommendations = sites.iter().any(|s| s.recommendations.is_some());
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(csv_headers(with_recommendations))?;

    let cell = |score: Option<f64>| score.map(|s| s.to_string()).unwrap_or_default();
    for site in sites {
        let result = &site.result;
        let mut row = vec![result.name.clone().unwrap_or_default()];
        row.extend(Category::ALL.iter().map(|c| cell(result.scores.get(*c))));
        row.push(cell(result.global_score));
        row.push(result.risk_level.label().to_string());

        if with_recommendations {
            let recs = site.recommendations.clone().unwrap_or_default();
            row.extend([
                recs.air.join("\n"),
                recs.water.join("\n"),
                recs.soil.join("\n"),
                recs.human.join("\n"),
                recs.general.join("\n"),
                recs.priority.map(|p| p.label().to_string()).unwrap_or_default(),
            ]);
        }
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SiteRecord;
    use crate::recommend::recommend_all;
    use crate::scoring::score;

    fn sample_records() -> Vec<SiteRecord> {
        vec![
            SiteRecord {
                name: Some("Low".to_string()),
                pm25: Some(5.0),
                ..Default::default()
            },
            SiteRecord::default(),
            SiteRecord {
                name: Some("High".to_string()),
                pm25: Some(40.0),
                humidity: Some(20.0),
                ..Default::default()
            },
        ]
    }

    fn sample_sites() -> Vec<AssessedSite> {
        assemble(score(&sample_records()), None)
    }

    #[test]
    fn test_text_marks_missing_scores() {
        let text = render_text(&sample_sites());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("SITE"));
        assert!(lines[1].contains("2.00"));
        assert!(lines[1].contains("Faible"));
        assert!(lines[2].starts_with("Site 2"));
        assert!(lines[2].contains("N/A"));
        assert!(lines[2].ends_with("Inconnu"));
        assert!(lines[3].contains("9.00"));
        assert!(lines[3].ends_with("Élevé"));
    }

    #[test]
    fn test_summary_lines() {
        let summary = render_summary(&sample_sites());
        assert_eq!(
            summary,
            "- Low: risk level Faible (score: 2.00)\n\
             - Site 2: risk level Inconnu (score: N/A)\n\
             - High: risk level Élevé (score: 9.00)\n"
        );
    }

    #[test]
    fn test_sort_puts_undefined_last() {
        let sorted = sort_sites(sample_sites());
        let order: Vec<usize> = sorted.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_json_uses_output_columns() {
        let json = render_json(&sample_sites());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["niveau_risque"], "Inconnu");
        assert!(rows[1]["score_global"].is_null());
        assert_eq!(rows[2]["score_eau"], 8.0);
        assert!(rows[0].get("priorite_action").is_none());
    }

    #[test]
    fn test_json_includes_recommendations_when_present() {
        let records = sample_records();
        let results = score(&records);
        let recs = recommend_all(&records, &results);
        let sites = assemble(results, Some(recs));
        let value: serde_json::Value = serde_json::from_str(&render_json(&sites)).unwrap();
        assert_eq!(value[2]["priorite_action"], "Haute");
        assert!(value[1]["priorite_action"].is_null());
        assert!(value[2]["recommandations_air"].as_array().unwrap().len() >= 3);
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&sample_sites(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "nom_site,score_air,score_eau,score_sol,score_humain,score_global,niveau_risque"
        );
        assert_eq!(lines[1], "Low,2,,,,2,Faible");
        assert_eq!(lines[2], ",,,,,,Inconnu");
        assert_eq!(lines[3], "High,10,8,,,9,Élevé");
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate_or_pad("abcdefghij", 6), "abc...");
        assert_eq!(truncate_or_pad("abc", 5), "abc  ");
    }
}
