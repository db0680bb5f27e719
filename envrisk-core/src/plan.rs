//! Action planning
//!
//! Turns site recommendations into dated, budgeted actions. Every advice
//! line becomes one action. Schedules are relative to a caller-supplied
//! reference date so the same input always yields the same plan.
//!
//! Global invariants enforced:
//! - Actions follow site order, then category order (Air, Eau, Sol, Humain, Général)
//! - Action ids run from 1 across the whole plan
//! - `end_date - start_date` always equals the priority's duration

use crate::recommend::{ActionPriority, SiteRecommendations};
use crate::report::AssessedSite;
use crate::scoring::Category;
use chrono::{Duration, NaiveDate};
use serde::{Serialize, Serializer};

/// Status of a freshly planned action
pub const PLANNED_STATUS: &str = "À faire";

/// Days between the starts of consecutive actions of one site
pub const STAGGER_DAYS: i64 = 3;

/// Column order of exported plans
pub const PLAN_COLUMNS: [&str; 9] = [
    "site",
    "action",
    "categorie",
    "priorite",
    "responsable",
    "date_debut",
    "date_fin",
    "budget_estime",
    "statut",
];

/// Category of a planned action; general advice gets its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanCategory {
    Site(Category),
    General,
}

impl PlanCategory {
    pub const ALL: [PlanCategory; 5] = [
        PlanCategory::Site(Category::Air),
        PlanCategory::Site(Category::Water),
        PlanCategory::Site(Category::Soil),
        PlanCategory::Site(Category::Human),
        PlanCategory::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlanCategory::Site(category) => category.label(),
            PlanCategory::General => "Général",
        }
    }

    /// Team owning actions of this category
    pub fn responsible(&self) -> &'static str {
        match self {
            PlanCategory::Site(Category::Air) => "Équipe Qualité de l'Air",
            PlanCategory::Site(Category::Water) => "Équipe Gestion des Eaux",
            PlanCategory::Site(Category::Soil) => "Équipe Géologie",
            PlanCategory::Site(Category::Human) => "Équipe Relations Communautaires",
            PlanCategory::General => "Direction Environnementale",
        }
    }

    fn lines<'a>(&self, recs: &'a SiteRecommendations) -> &'a [String] {
        match self {
            PlanCategory::Site(category) => recs.for_category(*category),
            PlanCategory::General => &recs.general,
        }
    }
}

impl Serialize for PlanCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Timing and budget rules for one priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start_delay_days: i64,
    pub duration_days: i64,
    pub base_budget: u32,
    pub budget_step: u32,
}

impl Schedule {
    pub fn for_priority(priority: ActionPriority) -> Self {
        match priority {
            ActionPriority::High => Schedule {
                start_delay_days: 7,
                duration_days: 30,
                base_budget: 15_000,
                budget_step: 5_000,
            },
            ActionPriority::Medium => Schedule {
                start_delay_days: 14,
                duration_days: 60,
                base_budget: 5_000,
                budget_step: 3_000,
            },
            ActionPriority::Low => Schedule {
                start_delay_days: 30,
                duration_days: 90,
                base_budget: 2_000,
                budget_step: 1_000,
            },
        }
    }

    /// Budget varies with the action id over three steps
    pub fn budget(&self, action_id: u32) -> u32 {
        self.base_budget + self.budget_step * (action_id % 3)
    }
}

/// One dated, budgeted action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedAction {
    #[serde(skip)]
    pub id: u32,
    pub site: String,
    pub action: String,
    #[serde(rename = "categorie")]
    pub category: PlanCategory,
    #[serde(rename = "priorite")]
    pub priority: ActionPriority,
    #[serde(rename = "responsable")]
    pub responsible: &'static str,
    #[serde(rename = "date_debut")]
    pub start_date: NaiveDate,
    #[serde(rename = "date_fin")]
    pub end_date: NaiveDate,
    #[serde(rename = "budget_estime")]
    pub estimated_budget: u32,
    #[serde(rename = "statut")]
    pub status: &'static str,
}

/// Build the action plan for assessed sites
///
/// Sites without recommendations contribute nothing. A site whose priority
/// is undefined is planned as `Moyenne`.
pub fn plan_actions(sites: &[AssessedSite], reference_date: NaiveDate) -> Vec<PlannedAction> {
    let mut actions = Vec::new();
    let mut next_id: u32 = 1;

    for site in sites {
        let Some(recs) = site.recommendations.as_ref() else {
            continue;
        };
        let priority = recs.priority.unwrap_or(ActionPriority::Medium);
        let schedule = Schedule::for_priority(priority);
        let duration = Duration::days(schedule.duration_days);
        let mut start_date = reference_date + Duration::days(schedule.start_delay_days);
        let site_name = site.display_name();

        for category in PlanCategory::ALL {
            for line in category.lines(recs) {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                actions.push(PlannedAction {
                    id: next_id,
                    site: site_name.clone(),
                    action: line.to_string(),
                    category,
                    priority,
                    responsible: category.responsible(),
                    start_date,
                    end_date: start_date + duration,
                    estimated_budget: schedule.budget(next_id),
                    status: PLANNED_STATUS,
                });
                next_id += 1;
                start_date += Duration::days(STAGGER_DAYS);
            }
        }
    }

    tracing::debug!(actions = actions.len(), "planned actions");
    actions
}

/// Render the plan as a text table, one action per line
pub fn render_plan_text(actions: &[PlannedAction]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<4} {:<20} {:<8} {:<8} {:<10} {:<10} {:>8} ACTION\n",
        "ID", "SITE", "CAT", "PRIO", "START", "END", "BUDGET"
    ));

    for action in actions {
        output.push_str(&format!(
            "{:<4} {:<20} {:<8} {:<8} {:<10} {:<10} {:>8} {}\n",
            action.id,
            truncate(&action.site, 20),
            action.category.label(),
            action.priority.label(),
            action.start_date.to_string(),
            action.end_date.to_string(),
            action.estimated_budget,
            action.action,
        ));
    }

    let total: u64 = actions.iter().map(|a| u64::from(a.estimated_budget)).sum();
    output.push_str(&format!("\n{} actions, estimated budget {}\n", actions.len(), total));
    output
}

/// Render the plan as JSON
pub fn render_plan_json(actions: &[PlannedAction]) -> String {
    serde_json::to_string_pretty(actions).unwrap_or_else(|_| "[]".to_string())
}

/// Write the plan as CSV with [`PLAN_COLUMNS`]
pub fn write_plan_csv<W: std::io::Write>(
    actions: &[PlannedAction],
    writer: W,
) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(PLAN_COLUMNS)?;

    for action in actions {
        out.write_record([
            action.site.clone(),
            action.action.clone(),
            action.category.label().to_string(),
            action.priority.label().to_string(),
            action.responsible.to_string(),
            action.start_date.to_string(),
            action.end_date.to_string(),
            action.estimated_budget.to_string(),
            action.status.to_string(),
        ])?;
    }

    out.flush()?;
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
