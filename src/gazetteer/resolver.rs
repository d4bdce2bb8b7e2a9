//! Maps a matched surface string back to the entity label it should carry.

use crate::{
    error::{GazetteerError, Result},
    gazetteer::patterns::{PatternRecord, PatternRegistry},
};

#[derive(Debug, Clone)]
pub struct LabelResolver {
    registry: PatternRegistry,
    default_label: String,
}

impl LabelResolver {
    pub fn new(registry: PatternRegistry, default_label: impl Into<String>) -> Self {
        Self {
            registry,
            default_label: default_label.into(),
        }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    /// First record registered for `surface`.
    pub fn record(&self, surface: &str) -> Result<&PatternRecord> {
        self.registry
            .records(surface)
            .and_then(<[PatternRecord]>::first)
            .ok_or_else(|| GazetteerError::UnknownSurface(surface.to_string()))
    }

    /// The record's `ent_type`, or the default label when it has none.
    pub fn resolve(&self, surface: &str) -> Result<&str> {
        let record = self.record(surface)?;
        Ok(record.ent_type.as_deref().unwrap_or(&self.default_label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::patterns::{Patterns, PatternsByClass};

    fn resolver() -> LabelResolver {
        let patterns = Patterns::from([
            (
                "John Smith".to_string(),
                vec![
                    PatternRecord::new("John Smith").with_type("ARTIST"),
                    PatternRecord::new("John Smith").with_type("AUTHOR"),
                ],
            ),
            ("Mary Sanchez".to_string(), vec![PatternRecord::new("Mary Sanchez")]),
        ]);
        let classes = PatternsByClass::from([(
            "Artist".to_string(),
            vec!["John Smith".to_string(), "Mary Sanchez".to_string()],
        )]);
        LabelResolver::new(PatternRegistry::new(patterns, classes).unwrap(), "CUSTOM")
    }

    #[test]
    fn first_record_type_wins() {
        assert_eq!(resolver().resolve("John Smith").unwrap(), "ARTIST");
    }

    #[test]
    fn missing_type_falls_back_to_default() {
        assert_eq!(resolver().resolve("Mary Sanchez").unwrap(), "CUSTOM");
    }

    #[test]
    fn unknown_surface_is_an_error() {
        let err = resolver().resolve("Nobody").unwrap_err();
        assert!(matches!(err, GazetteerError::UnknownSurface(s) if s == "Nobody"));
    }
}
