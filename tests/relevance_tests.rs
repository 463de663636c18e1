//! Tests for the relevance classifier

use pinharvest::harvest::RelevanceClassifier;

#[test]
fn sparse_topic_enables_permissive_mode() {
    assert!(RelevanceClassifier::new("vintage advert posters").permissive());
    assert!(RelevanceClassifier::new("facebook ads").permissive());
    assert!(!RelevanceClassifier::new("mountain lakes").permissive());
}

#[test]
fn permissive_mode_always_admits() {
    let classifier = RelevanceClassifier::new("retro ads");
    // No identifiers observed, confirmed inside results, query request
    assert!(classifier.classify("https://i.pinimg.com/originals/x.jpg", true, false));
}

#[test]
fn board_requests_always_admit() {
    let classifier = RelevanceClassifier::new("mountain lakes");
    assert!(classifier.classify("https://i.pinimg.com/originals/x.jpg", true, true));
}

#[test]
fn admits_everything_before_results_view_confirmed() {
    let classifier = RelevanceClassifier::new("mountain lakes");
    assert!(classifier.classify("https://i.pinimg.com/originals/x.jpg", false, false));
}

#[test]
fn matches_identifier_embedded_in_address() {
    let classifier = RelevanceClassifier::new("mountain lakes");
    classifier.observe_identifier("812345670");

    assert!(classifier.classify(
        "https://i.pinimg.com/originals/ab/cd/812345670abc.jpg",
        true,
        false
    ));
    assert!(!classifier.classify(
        "https://i.pinimg.com/originals/ab/cd/999999999abc.jpg",
        true,
        false
    ));
}

#[test]
fn empty_identifier_set_rejects_inside_results() {
    let classifier = RelevanceClassifier::new("mountain lakes");
    assert!(!classifier.classify("https://i.pinimg.com/originals/x.jpg", true, false));
}

#[test]
fn observe_identifier_is_idempotent() {
    let classifier = RelevanceClassifier::new("mountain lakes");
    classifier.observe_identifier("42");
    classifier.observe_identifier("42");
    assert_eq!(classifier.identifier_count(), 1);
}
