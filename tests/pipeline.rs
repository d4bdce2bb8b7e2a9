use gazetteer_ner::{
    gazetteer::{
        compose, initialise_nlp, GazetteerConfig, PatternRecord, Patterns, PatternsByClass,
        GAZETTEER_PIPE,
    },
    nlp::{Doc, Language, NER_PIPE},
};

fn record(label: &str, ent_type: Option<&str>, action: &str) -> PatternRecord {
    serde_json::from_value(serde_json::json!({
        "ent_label": label,
        "ent_type": ent_type,
        "ent_action": action,
        "ent_data": null,
    }))
    .unwrap()
}

fn artists() -> Language {
    let patterns = Patterns::from([
        (
            "John Smith".to_string(),
            vec![record("John Smith", Some("ARTIST"), "Replace")],
        ),
        (
            "Mary Sanchez".to_string(),
            vec![record("Mary Sanchez", None, "Add")],
        ),
    ]);
    let classes = PatternsByClass::from([(
        "Artist".to_string(),
        vec!["John Smith".to_string(), "Mary Sanchez".to_string()],
    )]);
    initialise_nlp(None, Some(patterns), Some(classes), Some("CUSTOM")).unwrap()
}

fn tribes() -> Language {
    let mut patterns = Patterns::new();
    for surface in ["Foo", "F00", "Fooo"] {
        patterns.insert(surface.to_string(), vec![record("Foo", Some("TRIBE"), "Replace")]);
    }
    for surface in ["Bar", "Baar", "BaRR"] {
        patterns.insert(surface.to_string(), vec![record("Bar", Some("GPE"), "Add")]);
    }
    let classes = PatternsByClass::from([
        (
            "TRIBE".to_string(),
            vec!["F00".to_string(), "Foo".to_string(), "Fooo".to_string()],
        ),
        (
            "GPE".to_string(),
            vec!["Baar".to_string(), "Bar".to_string(), "BaRR".to_string()],
        ),
    ]);
    initialise_nlp(None, Some(patterns), Some(classes), None).unwrap()
}

const ARTIST_TEXT: &str =
    "John Smith was a famous painter, who regularly exhibited with Mary Sanchez, the engraver.";
const TRIBE_TEXT: &str = "The Foo were a lesser known tribe, who lived in the country of Bar.";

fn texts(doc: &Doc) -> Vec<&str> {
    doc.ents().into_iter().map(|ent| ent.text(doc)).collect()
}

fn labels(doc: &Doc) -> Vec<String> {
    doc.ents()
        .into_iter()
        .filter_map(|ent| ent.label_text(doc))
        .collect()
}

fn original_labels(doc: &Doc) -> Vec<Vec<Option<String>>> {
    doc.ents()
        .into_iter()
        .map(|ent| {
            ent.original_labels(doc)
                .into_iter()
                .map(|id| id.and_then(|id| doc.vocab().resolve(id)))
                .collect()
        })
        .collect()
}

#[test]
fn gazetteer_runs_right_after_the_recognizer() {
    assert_eq!(artists().pipe_names(), vec![NER_PIPE, GAZETTEER_PIPE]);
    assert_eq!(GAZETTEER_PIPE, "flashpatternmatcher");
}

#[test]
fn matched_phrases_become_entities() {
    let doc = artists().process(ARTIST_TEXT).unwrap();
    assert_eq!(texts(&doc), vec!["John Smith", "Mary Sanchez"]);
}

#[test]
fn missing_type_uses_the_default_label() {
    let doc = artists().process(ARTIST_TEXT).unwrap();
    assert_eq!(labels(&doc), vec!["ARTIST", "CUSTOM"]);
}

#[test]
fn overridden_labels_stay_queryable() {
    let doc = artists().process(ARTIST_TEXT).unwrap();
    let person = Some("PERSON".to_string());
    assert_eq!(original_labels(&doc), vec![vec![person.clone()], vec![person]]);
}

#[test]
fn matched_spans_are_merged_into_single_tokens() {
    let nlp = artists();
    let before = nlp.make_doc(ARTIST_TEXT).len();
    let doc = nlp.process(ARTIST_TEXT).unwrap();
    assert_eq!(doc.len(), before - 2);
    assert_eq!(doc.tokens()[0].text(&doc), "John Smith");
}

#[test]
fn spelling_variants_resolve_to_their_class_type() {
    let doc = tribes().process(TRIBE_TEXT).unwrap();
    assert_eq!(texts(&doc), vec!["Foo", "Bar"]);
    assert_eq!(labels(&doc), vec!["TRIBE", "GPE"]);
    assert!(labels(&doc).iter().all(|label| label != "CUSTOM"));
}

#[test]
fn tokens_without_prior_entity_report_none() {
    let doc = tribes().process(TRIBE_TEXT).unwrap();
    assert_eq!(
        original_labels(&doc),
        vec![vec![None], vec![Some("GPE".to_string())]]
    );
}

#[test]
fn every_variant_matches_independently() {
    let doc = tribes()
        .process("F00 and Fooo met the BaRR and the Baar.")
        .unwrap();
    assert_eq!(texts(&doc), vec!["F00", "Fooo", "BaRR", "Baar"]);
    assert_eq!(labels(&doc), vec!["TRIBE", "TRIBE", "GPE", "GPE"]);
}

#[test]
fn case_insensitive_by_default() {
    let doc = artists().process("Then JOHN SMITH left.").unwrap();
    assert_eq!(texts(&doc), vec!["JOHN SMITH"]);
    assert_eq!(labels(&doc), vec!["ARTIST"]);
}

#[test]
fn case_variants_with_different_types_keep_their_own_label() {
    let patterns = Patterns::from([
        ("Us".to_string(), vec![record("Us", Some("BAND"), "Replace")]),
        ("US".to_string(), vec![record("US", Some("GPE"), "Replace")]),
    ]);
    let classes = PatternsByClass::from([("X".to_string(), vec!["Us".to_string(), "US".to_string()])]);
    let nlp = compose(Language::blank(), Some(patterns), Some(classes), GazetteerConfig::default())
        .unwrap();

    let doc = nlp.process("She moved to the US .").unwrap();
    assert_eq!(texts(&doc), vec!["US"]);
    assert_eq!(labels(&doc), vec!["GPE"]);

    let doc = nlp.process("Us played , then us again .").unwrap();
    assert_eq!(texts(&doc), vec!["Us", "us"]);
    assert_eq!(labels(&doc), vec!["BAND", "BAND"]);
}
