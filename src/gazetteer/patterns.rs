//! Pattern records and the validated registry built from them.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{GazetteerError, Result};

/// Surface string → pattern records registered for it.
pub type Patterns = IndexMap<String, Vec<PatternRecord>>;
/// Class name → surface strings belonging to it.
pub type PatternsByClass = IndexMap<String, Vec<String>>;

/// What a pattern asks the annotator to do with a matched span.
///
/// Only carried through; the annotator currently always overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntAction {
    #[default]
    Replace,
    Add,
    #[serde(other)]
    Other,
}

/// Metadata attached to one surface string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub ent_label: String,
    /// Entity label to apply. `None` falls back to the default label.
    #[serde(default)]
    pub ent_type: Option<String>,
    #[serde(default)]
    pub ent_action: EntAction,
    #[serde(default)]
    pub ent_data: Option<serde_json::Value>,
}

impl PatternRecord {
    pub fn new(ent_label: impl Into<String>) -> Self {
        Self {
            ent_label: ent_label.into(),
            ent_type: None,
            ent_action: EntAction::default(),
            ent_data: None,
        }
    }

    pub fn with_type(mut self, ent_type: impl Into<String>) -> Self {
        self.ent_type = Some(ent_type.into());
        self
    }

    pub fn with_action(mut self, action: EntAction) -> Self {
        self.ent_action = action;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.ent_data = Some(data);
        self
    }
}

/// Pattern records plus class membership, checked for consistency.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: Patterns,
    classes: PatternsByClass,
}

impl PatternRegistry {
    /// Every surface string listed under a class must have at least one
    /// record in `patterns`.
    pub fn new(patterns: Patterns, classes: PatternsByClass) -> Result<Self> {
        for (class, surfaces) in &classes {
            for surface in surfaces {
                let has_record = patterns
                    .get(surface)
                    .is_some_and(|records| !records.is_empty());
                if !has_record {
                    return Err(GazetteerError::MissingPattern {
                        class: class.clone(),
                        surface: surface.clone(),
                    });
                }
            }
        }
        Ok(Self { patterns, classes })
    }

    pub fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    pub fn classes(&self) -> &PatternsByClass {
        &self.classes
    }

    pub fn records(&self, surface: &str) -> Option<&[PatternRecord]> {
        self.patterns.get(surface).map(Vec::as_slice)
    }

    /// Distinct surface strings across all classes, in registration order.
    pub fn surfaces(&self) -> IndexSet<&str> {
        self.classes
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn records_deserialize_with_optional_fields() {
        let raw = json!({
            "John Smith": [{"ent_label": "John Smith", "ent_type": "ARTIST", "ent_action": "Replace", "ent_data": null}],
            "Mary Sanchez": [{"ent_label": "Mary Sanchez", "ent_type": null, "ent_action": "Add"}],
            "Odd": [{"ent_label": "Odd", "ent_action": "Remove", "ent_data": {"source": "manual"}}]
        });
        let patterns: Patterns = serde_json::from_value(raw).unwrap();
        assert_eq!(patterns["John Smith"][0].ent_type.as_deref(), Some("ARTIST"));
        assert_eq!(patterns["Mary Sanchez"][0].ent_action, EntAction::Add);
        assert_eq!(patterns["Odd"][0].ent_action, EntAction::Other);
        assert_eq!(patterns["Odd"][0].ent_data, Some(json!({"source": "manual"})));
    }

    #[test]
    fn class_surface_without_record_is_rejected() {
        let patterns = Patterns::from([(
            "Foo".to_string(),
            vec![PatternRecord::new("Foo").with_type("TRIBE")],
        )]);
        let classes = PatternsByClass::from([(
            "TRIBE".to_string(),
            vec!["Foo".to_string(), "Fooo".to_string()],
        )]);
        let err = PatternRegistry::new(patterns, classes).unwrap_err();
        assert!(matches!(
            err,
            GazetteerError::MissingPattern { ref class, ref surface } if class == "TRIBE" && surface == "Fooo"
        ));
    }

    #[test]
    fn empty_record_list_counts_as_missing() {
        let patterns = Patterns::from([("Bar".to_string(), Vec::new())]);
        let classes = PatternsByClass::from([("GPE".to_string(), vec!["Bar".to_string()])]);
        assert!(PatternRegistry::new(patterns, classes).is_err());
    }

    #[test]
    fn surfaces_are_deduplicated_in_order() {
        let patterns = Patterns::from([
            ("Bar".to_string(), vec![PatternRecord::new("Bar")]),
            ("Baar".to_string(), vec![PatternRecord::new("Bar")]),
        ]);
        let classes = PatternsByClass::from([
            ("GPE".to_string(), vec!["Baar".to_string(), "Bar".to_string()]),
            ("PLACE".to_string(), vec!["Bar".to_string()]),
        ]);
        let registry = PatternRegistry::new(patterns, classes).unwrap();
        assert_eq!(registry.surfaces().into_iter().collect::<Vec<_>>(), vec!["Baar", "Bar"]);
    }
}
