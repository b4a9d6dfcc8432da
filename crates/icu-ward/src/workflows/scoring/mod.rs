//! Range-bucketed clinical scoring.
//!
//! Every variable is a static [`RangeTable`]; a [`Scale`] bundles the tables of one
//! instrument with its tier thresholds. Scoring is a pure lookup over that data.

mod bands;
pub mod complexity;
pub mod severity;

pub use bands::{Band, BandKey, RangeTable, TierBand};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw form input for one variable: a measurement or the id of a band picked directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentSelection {
    Measurement(f64),
    Choice(String),
}

/// Points awarded for one variable, with the band that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub points: u32,
    pub band_id: String,
    pub band_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<f64>,
}

/// Tier resolved from a total score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("{scale} has no variable '{variable}'")]
    UnknownVariable {
        scale: &'static str,
        variable: String,
    },
    #[error("'{variable}' is derived from patient data and cannot be entered")]
    DerivedVariable { variable: String },
    #[error("no {variable} band matches {value}")]
    OutOfDomain { variable: String, value: String },
    #[error("missing selections for: {}", .missing.join(", "))]
    Incomplete { missing: Vec<String> },
}

/// Resolves a selection against a single table.
pub fn score(
    table: &RangeTable,
    selection: &ComponentSelection,
) -> Result<ComponentScore, ScoringError> {
    let (band, measurement) = match selection {
        ComponentSelection::Measurement(value) => (table.lookup(*value), Some(*value)),
        ComponentSelection::Choice(option) => (table.choose(option), None),
    };

    let band = band.ok_or_else(|| ScoringError::OutOfDomain {
        variable: table.variable.to_string(),
        value: match selection {
            ComponentSelection::Measurement(value) => value.to_string(),
            ComponentSelection::Choice(option) => format!("'{option}'"),
        },
    })?;

    Ok(ComponentScore {
        points: band.points,
        band_id: band.id.to_string(),
        band_label: band.label.to_string(),
        measurement,
    })
}

pub fn total_score(components: &BTreeMap<String, ComponentScore>) -> u32 {
    components.values().map(|component| component.points).sum()
}

/// First band whose inclusive ceiling holds `total`; the open band catches the rest.
pub fn tier_of(total: u32, tiers: &[TierBand]) -> Option<Tier> {
    tiers
        .iter()
        .find(|band| band.max_total.map_or(true, |max| total <= max))
        .map(|band| Tier {
            label: band.tier.to_string(),
            note: band.note.map(str::to_string),
        })
}

/// A scored instrument: its tables, which of them are computed rather than entered, and
/// how totals map to tiers.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scale {
    pub id: &'static str,
    pub name: &'static str,
    pub tables: &'static [RangeTable],
    pub derived: &'static [&'static str],
    pub tiers: &'static [TierBand],
}

/// Fully scored submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub components: BTreeMap<String, ComponentScore>,
    pub total: u32,
    pub tier: Tier,
}

impl Scale {
    pub fn table(&self, variable: &str) -> Option<&'static RangeTable> {
        self.tables.iter().find(|table| table.variable == variable)
    }

    pub fn is_derived(&self, variable: &str) -> bool {
        self.derived.iter().any(|derived| *derived == variable)
    }

    /// Variables the clinician must select explicitly.
    pub fn required_variables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables
            .iter()
            .map(|table| table.variable)
            .filter(|variable| !self.is_derived(variable))
    }

    /// Required variables with no selection. A selection of a 0-point band counts as made.
    pub fn missing_variables(
        &self,
        selections: &BTreeMap<String, ComponentSelection>,
    ) -> Vec<String> {
        self.required_variables()
            .filter(|variable| !selections.contains_key(*variable))
            .map(str::to_string)
            .collect()
    }

    pub fn score(
        &self,
        variable: &str,
        selection: &ComponentSelection,
    ) -> Result<ComponentScore, ScoringError> {
        let table = self
            .table(variable)
            .ok_or_else(|| ScoringError::UnknownVariable {
                scale: self.id,
                variable: variable.to_string(),
            })?;
        score(table, selection)
    }

    pub fn tier_of(&self, total: u32) -> Tier {
        tier_of(total, self.tiers).unwrap_or_else(|| Tier {
            label: "Unclassified".to_string(),
            note: None,
        })
    }

    /// Scores user selections plus the derived measurements computed by the caller.
    pub fn score_all(
        &self,
        selections: &BTreeMap<String, ComponentSelection>,
        derived: &BTreeMap<&'static str, f64>,
    ) -> Result<ScoreCard, ScoringError> {
        let missing = self.missing_variables(selections);
        if !missing.is_empty() {
            return Err(ScoringError::Incomplete { missing });
        }

        let mut components = BTreeMap::new();
        for (variable, selection) in selections {
            if self.is_derived(variable) {
                return Err(ScoringError::DerivedVariable {
                    variable: variable.clone(),
                });
            }
            components.insert(variable.clone(), self.score(variable, selection)?);
        }

        for variable in self.derived {
            let value = derived
                .get(variable)
                .ok_or_else(|| ScoringError::Incomplete {
                    missing: vec![variable.to_string()],
                })?;
            let component = self.score(variable, &ComponentSelection::Measurement(*value))?;
            components.insert(variable.to_string(), component);
        }

        let total = total_score(&components);
        Ok(ScoreCard {
            tier: self.tier_of(total),
            components,
            total,
        })
    }

    /// Highest total the scale can produce.
    pub fn max_total(&self) -> u32 {
        self.tables.iter().map(RangeTable::max_points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: &[TierBand] = &[
        TierBand::up_to(4, "Low", None),
        TierBand::up_to(9, "Low-Moderate", None),
        TierBand::open("High", None),
    ];

    #[test]
    fn tier_bounds_are_inclusive() {
        assert_eq!(tier_of(0, TIERS).map(|tier| tier.label), Some("Low".into()));
        assert_eq!(tier_of(4, TIERS).map(|tier| tier.label), Some("Low".into()));
        assert_eq!(
            tier_of(5, TIERS).map(|tier| tier.label),
            Some("Low-Moderate".into())
        );
        assert_eq!(tier_of(250, TIERS).map(|tier| tier.label), Some("High".into()));
    }

    #[test]
    fn total_is_the_sum_of_component_points() {
        let mut components = BTreeMap::new();
        for (variable, points) in [("a", 3), ("b", 0), ("c", 4)] {
            components.insert(
                variable.to_string(),
                ComponentScore {
                    points,
                    band_id: "x".to_string(),
                    band_label: "x".to_string(),
                    measurement: None,
                },
            );
        }
        assert_eq!(total_score(&components), 7);
        assert_eq!(total_score(&BTreeMap::new()), 0);
    }

    #[test]
    fn selections_deserialize_from_numbers_or_option_ids() {
        let selections: BTreeMap<String, ComponentSelection> =
            serde_json::from_str(r#"{"heart_rate": 112, "chronic_health": "none"}"#)
                .expect("selections parse");
        assert_eq!(
            selections["heart_rate"],
            ComponentSelection::Measurement(112.0)
        );
        assert_eq!(
            selections["chronic_health"],
            ComponentSelection::Choice("none".to_string())
        );
    }
}
