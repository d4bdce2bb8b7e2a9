use std::sync::Arc;

use gazetteer_ner::{
    gazetteer::{compose, GazetteerConfig, PatternRecord, Patterns, PatternsByClass},
    nlp::{DictionaryNer, Language},
};
use indexmap::IndexSet;
use proptest::prelude::*;

/// Base pipeline whose recognizer tags `surface` as PERSON wherever it occurs.
fn tagged_base(surface: &str) -> Language {
    Language::blank()
        .with_ner(Arc::new(
            DictionaryNer::default().with_terms("PERSON", [surface]),
        ))
        .unwrap()
}

proptest! {
    #[test]
    fn explicit_type_beats_prior_label(
        surface in "[A-Z][a-z]{2,8}( [A-Z][a-z]{2,8})?",
        ent_type in "[A-Z]{3,8}",
    ) {
        let patterns = Patterns::from([(
            surface.clone(),
            vec![PatternRecord::new(surface.clone()).with_type(ent_type.clone())],
        )]);
        let classes = PatternsByClass::from([("Class".to_string(), vec![surface.clone()])]);
        let nlp = compose(tagged_base(&surface), Some(patterns), Some(classes), GazetteerConfig::default())
            .unwrap();
        let text = format!("{surface} , 1 {surface} ; 2 {surface} .");

        let doc = nlp.process(&text).unwrap();
        let ents = doc.ents();
        prop_assert_eq!(ents.len(), 3);
        let person = doc.vocab().get("PERSON");
        for ent in ents {
            prop_assert_eq!(ent.text(&doc), surface.as_str());
            prop_assert_eq!(ent.label_text(&doc), Some(ent_type.clone()));
            let originals: Vec<_> = ent.original_labels(&doc).into_iter().collect();
            prop_assert_eq!(originals, vec![person]);
        }
    }

    #[test]
    fn case_variants_share_their_class_label(word in "[A-Za-z]{3,8}") {
        let variants: IndexSet<String> =
            [word.clone(), word.to_ascii_uppercase(), word.to_ascii_lowercase()]
                .into_iter()
                .collect();
        let patterns: Patterns = variants
            .iter()
            .map(|v| (v.clone(), vec![PatternRecord::new(word.clone()).with_type("TRIBE")]))
            .collect();
        let classes = PatternsByClass::from([(
            "TRIBE".to_string(),
            variants.iter().cloned().collect(),
        )]);
        let config = GazetteerConfig::default().with_case_sensitive(true);
        let nlp = compose(Language::blank(), Some(patterns), Some(classes), config).unwrap();
        let text = variants.iter().cloned().collect::<Vec<_>>().join(" , ");

        let doc = nlp.process(&text).unwrap();
        let ents = doc.ents();
        prop_assert_eq!(ents.len(), variants.len());
        for (ent, variant) in ents.iter().zip(&variants) {
            prop_assert_eq!(ent.text(&doc), variant.as_str());
            let label = ent.label_text(&doc);
            prop_assert_eq!(label.as_deref(), Some("TRIBE"));
        }
    }
}
