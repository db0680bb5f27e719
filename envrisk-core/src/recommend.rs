//! Recommendation generation
//!
//! Turns category scores and raw factors into advice lists and an action
//! priority. The advice cutoffs are strict (`> 6.5`, `> 3.5`) and do not
//! follow configured risk levels.

use crate::record::SiteRecord;
use crate::scoring::{Category, SiteRiskResult};
use crate::weather::{self, WeatherKind};
use serde::{Serialize, Serializer};

const HIGH_CUTOFF: f64 = 6.5;
const MODERATE_CUTOFF: f64 = 3.5;

/// Urgency of follow-up actions for a site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

impl ActionPriority {
    pub fn label(&self) -> &'static str {
        match self {
            ActionPriority::High => "Haute",
            ActionPriority::Medium => "Moyenne",
            ActionPriority::Low => "Basse",
        }
    }
}

impl Serialize for ActionPriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Advice for one site, grouped by category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteRecommendations {
    #[serde(rename = "recommandations_air")]
    pub air: Vec<String>,
    #[serde(rename = "recommandations_eau")]
    pub water: Vec<String>,
    #[serde(rename = "recommandations_sol")]
    pub soil: Vec<String>,
    #[serde(rename = "recommandations_humain")]
    pub human: Vec<String>,
    #[serde(rename = "recommandations_generales")]
    pub general: Vec<String>,
    #[serde(rename = "priorite_action")]
    pub priority: Option<ActionPriority>,
}

impl SiteRecommendations {
    pub fn for_category(&self, category: Category) -> &[String] {
        match category {
            Category::Air => &self.air,
            Category::Water => &self.water,
            Category::Soil => &self.soil,
            Category::Human => &self.human,
        }
    }
}

/// Tiered advice: (high, moderate, routine)
struct Advice {
    high: &'static [&'static str],
    moderate: &'static [&'static str],
    routine: &'static [&'static str],
}

impl Advice {
    fn pick(&self, score: f64) -> Vec<String> {
        let lines = if score > HIGH_CUTOFF {
            self.high
        } else if score > MODERATE_CUTOFF {
            self.moderate
        } else {
            self.routine
        };
        lines.iter().map(|s| s.to_string()).collect()
    }
}

const AIR_ADVICE: Advice = Advice {
    high: &[
        "Mettre en place un système de surveillance continue de la qualité de l'air",
        "Réduire les émissions de particules fines et de polluants atmosphériques",
        "Envisager des mesures de filtration de l'air pour les bâtiments à proximité",
    ],
    moderate: &[
        "Surveiller régulièrement les niveaux de pollution atmosphérique",
        "Identifier les sources locales de pollution de l'air",
    ],
    routine: &["Maintenir une surveillance de routine de la qualité de l'air"],
};

const WATER_ADVICE: Advice = Advice {
    high: &[
        "Mettre en place un plan de gestion des risques d'inondation",
        "Améliorer les systèmes de drainage et d'évacuation des eaux",
        "Surveiller la qualité des eaux de surface et souterraines",
    ],
    moderate: &[
        "Évaluer les risques liés aux précipitations extrêmes",
        "Vérifier l'état des infrastructures de gestion des eaux",
    ],
    routine: &["Maintenir une surveillance de routine des conditions hydriques"],
};

const SOIL_ADVICE: Advice = Advice {
    high: &[
        "Réaliser une analyse approfondie de la contamination des sols",
        "Mettre en œuvre des mesures de remédiation des sols si nécessaire",
        "Limiter l'érosion et améliorer la structure du sol",
    ],
    moderate: &[
        "Surveiller les changements dans la composition du sol",
        "Évaluer les risques d'érosion et de dégradation",
    ],
    routine: &["Maintenir des pratiques de gestion durable des sols"],
};

const HUMAN_ADVICE: Advice = Advice {
    high: &[
        "Élaborer un plan d'urgence pour la protection des populations",
        "Renforcer la sensibilisation aux risques environnementaux",
        "Mettre en place des zones tampons entre les activités à risque et les habitations",
    ],
    moderate: &[
        "Informer les populations locales des risques potentiels",
        "Surveiller l'impact des activités sur les communautés environnantes",
    ],
    routine: &["Maintenir une communication transparente avec les parties prenantes locales"],
};

const GENERAL_ADVICE: Advice = Advice {
    high: &[
        "Élaborer un plan d'action environnemental complet et urgent",
        "Réaliser des audits environnementaux réguliers",
        "Envisager des modifications significatives des pratiques actuelles",
    ],
    moderate: &[
        "Développer un programme de surveillance environnementale",
        "Identifier et traiter les facteurs de risque les plus importants",
        "Revoir les procédures opérationnelles pour minimiser les impacts",
    ],
    routine: &[
        "Maintenir les bonnes pratiques environnementales actuelles",
        "Documenter les changements environnementaux",
        "Rester informé des nouvelles réglementations et meilleures pratiques",
    ],
};

fn advice_for(category: Category) -> &'static Advice {
    match category {
        Category::Air => &AIR_ADVICE,
        Category::Water => &WATER_ADVICE,
        Category::Soil => &SOIL_ADVICE,
        Category::Human => &HUMAN_ADVICE,
    }
}

/// Priority from the global score; `None` when it is undefined
pub fn action_priority(global_score: Option<f64>) -> Option<ActionPriority> {
    global_score.map(|score| {
        if score > HIGH_CUTOFF {
            ActionPriority::High
        } else if score > MODERATE_CUTOFF {
            ActionPriority::Medium
        } else {
            ActionPriority::Low
        }
    })
}

/// Build recommendations for one scored site
pub fn recommend(record: &SiteRecord, result: &SiteRiskResult) -> SiteRecommendations {
    let tiered = |category: Category| {
        result
            .scores
            .get(category)
            .map(|score| advice_for(category).pick(score))
            .unwrap_or_default()
    };

    let mut recs = SiteRecommendations {
        air: tiered(Category::Air),
        water: tiered(Category::Water),
        soil: tiered(Category::Soil),
        human: tiered(Category::Human),
        general: result
            .global_score
            .map(|score| GENERAL_ADVICE.pick(score))
            .unwrap_or_default(),
        priority: action_priority(result.global_score),
    };

    add_factor_advice(record, &mut recs);
    recs
}

/// Build recommendations for a batch; `records` and `results` are paired by position
pub fn recommend_all(
    records: &[SiteRecord],
    results: &[SiteRiskResult],
) -> Vec<SiteRecommendations> {
    records
        .iter()
        .zip(results)
        .map(|(record, result)| recommend(record, result))
        .collect()
}

fn push_if(list: &mut Vec<String>, condition: bool, line: &str) {
    if condition {
        list.push(line.to_string());
    }
}

/// Advice triggered by individual measurements
fn add_factor_advice(r: &SiteRecord, recs: &mut SiteRecommendations) {
    let gt = |v: Option<f64>, cutoff: f64| v.is_some_and(|v| v > cutoff);
    let lt = |v: Option<f64>, cutoff: f64| v.is_some_and(|v| v < cutoff);

    push_if(&mut recs.air, gt(r.pm25, 25.0), "Réduire l'exposition aux particules fines PM2.5");
    push_if(
        &mut recs.air,
        gt(r.pm10, 50.0),
        "Mettre en place des mesures pour réduire les niveaux de PM10",
    );
    push_if(&mut recs.air, gt(r.no2, 40.0), "Surveiller et réduire les émissions d'oxydes d'azote");
    push_if(
        &mut recs.air,
        gt(r.o3, 100.0),
        "Limiter les activités extérieures lors des pics d'ozone",
    );

    push_if(
        &mut recs.water,
        lt(r.humidity, 30.0),
        "Mettre en place des mesures de conservation de l'eau",
    );
    push_if(
        &mut recs.water,
        gt(r.humidity, 80.0),
        "Améliorer la ventilation pour réduire les problèmes liés à l'humidité",
    );
    let wet_weather = r
        .weather_conditions
        .as_deref()
        .and_then(weather::classify)
        .is_some_and(|kind| matches!(kind, WeatherKind::Rain | WeatherKind::Storm));
    push_if(
        &mut recs.water,
        wet_weather,
        "Renforcer les systèmes de drainage pour gérer les précipitations",
    );

    push_if(
        &mut recs.soil,
        lt(r.soil_ph, 5.5),
        "Corriger l'acidité du sol pour améliorer sa qualité",
    );
    push_if(&mut recs.soil, gt(r.soil_ph, 8.5), "Traiter l'alcalinité excessive du sol");
    push_if(
        &mut recs.soil,
        lt(r.organic_carbon, 1.0),
        "Augmenter la teneur en matière organique du sol",
    );

    push_if(
        &mut recs.human,
        r.nearby_dwellings.is_some_and(|n| n > 50),
        "Évaluer l'impact des activités sur les zones résidentielles à proximité",
    );
    push_if(
        &mut recs.human,
        r.nearby_industrial_zones.is_some_and(|n| n > 0),
        "Coordonner les efforts de gestion environnementale avec les zones industrielles voisines",
    );
    push_if(
        &mut recs.human,
        lt(r.forest_cover_pct, 20.0),
        "Promouvoir la reforestation et la protection des espaces verts",
    );
}
