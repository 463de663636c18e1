//! Tests for the candidate collector's observation handling

use std::sync::Arc;

use pinharvest::harvest::collector::{CandidateCollector, Exchange, ExchangeKind};
use pinharvest::harvest::context::RunContext;
use pinharvest::harvest::types::HarvestTarget;

fn query_ctx(query: &str, limit: usize) -> Arc<RunContext> {
    Arc::new(RunContext::new(
        HarvestTarget::Query(query.to_string()),
        limit,
        800,
        800,
    ))
}

fn board_ctx(limit: usize) -> Arc<RunContext> {
    Arc::new(RunContext::new(
        HarvestTarget::Board("https://www.pinterest.com/someone/lakes/".to_string()),
        limit,
        800,
        800,
    ))
}

fn image_exchange(url: &str) -> Exchange {
    Exchange {
        kind: ExchangeKind::Image,
        status: 200,
        url: url.to_string(),
        body: None,
    }
}

fn api_exchange(url: &str, body: &str) -> Exchange {
    Exchange {
        kind: ExchangeKind::Api,
        status: 200,
        url: url.to_string(),
        body: Some(body.to_string()),
    }
}

#[test]
fn observations_before_collection_enabled_are_ignored() {
    let ctx = board_ctx(10);
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/736x/ab/cd/ef/img.jpg",
    ));
    assert_eq!(ctx.candidate_count(), 0);

    ctx.enable_collection();
    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/736x/ab/cd/ef/img.jpg",
    ));
    assert_eq!(ctx.candidate_count(), 1);
}

#[test]
fn tier_variants_of_one_image_collapse_to_one_candidate() {
    let ctx = board_ctx(10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/236x/ab/cd/ef/img.jpg",
    ));
    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/736x/ab/cd/ef/img.jpg",
    ));
    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/originals/ab/cd/ef/img.jpg",
    ));

    assert_eq!(ctx.candidate_count(), 1);
}

#[test]
fn collection_stops_at_the_ceiling() {
    let ctx = board_ctx(1);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    for i in 0..10 {
        collector.on_observation(&image_exchange(&format!(
            "https://i.pinimg.com/originals/ab/cd/ef/img{i}.jpg"
        )));
    }

    // Ceiling is three times the limit
    assert_eq!(ctx.candidate_count(), 3);
}

#[test]
fn non_success_image_responses_are_ignored() {
    let ctx = board_ctx(10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    collector.on_observation(&Exchange {
        kind: ExchangeKind::Image,
        status: 404,
        url: "https://i.pinimg.com/originals/ab/cd/ef/img.jpg".to_string(),
        body: None,
    });
    assert_eq!(ctx.candidate_count(), 0);
}

#[test]
fn ui_assets_are_rejected() {
    let ctx = board_ctx(10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    for url in [
        "https://i.pinimg.com/736x/icons/close.png",
        "https://i.pinimg.com/736x/avatar/user.jpg",
        "https://i.pinimg.com/736x/xx/yy/placeholder.jpg",
    ] {
        collector.on_observation(&image_exchange(url));
    }
    assert_eq!(ctx.candidate_count(), 0);
}

#[test]
fn micro_thumbnails_are_rejected_under_a_real_floor() {
    let ctx = board_ctx(10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/60x60/ab/cd/ef/avatar.jpg",
    ));
    assert_eq!(ctx.candidate_count(), 0);
}

#[test]
fn non_tiered_addresses_are_ignored() {
    let ctx = board_ctx(10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    collector.on_observation(&image_exchange("https://example.com/tracking.gif"));
    collector.on_observation(&image_exchange("https://example.com/photo.jpg"));
    assert_eq!(ctx.candidate_count(), 0);
}

#[test]
fn results_payload_feeds_the_classifier() {
    let ctx = query_ctx("lakes", 10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    let body = r#"{"resource": "grid_item", "data": [{"id": "812345670", "title": "mountain lakes at dawn"}]}"#;
    collector.on_observation(&api_exchange(
        "https://www.pinterest.com/search/pins/?q=lakes",
        body,
    ));

    assert!(ctx.inside_results());
    assert_eq!(ctx.classifier().identifier_count(), 1);

    // An image carrying the harvested identifier is stored as relevant
    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/736x/ab/cd/812345670abc.jpg",
    ));
    let candidates = ctx.candidates();
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].is_relevant);
}

#[test]
fn payload_without_structural_markers_yields_no_identifiers() {
    let ctx = query_ctx("lakes", 10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    let body = r#"{"data": [{"id": "812345670", "caption": "mountain lakes"}]}"#;
    collector.on_observation(&api_exchange(
        "https://www.pinterest.com/search/pins/?q=lakes",
        body,
    ));

    assert_eq!(ctx.classifier().identifier_count(), 0);
}

#[test]
fn metadata_originals_are_admitted_when_dimensions_qualify() {
    let ctx = board_ctx(10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    let body = r#"{"images": {"original": "https:\/\/i.pinimg.com\/originals\/ab\/cd\/big.jpg", "original_width": 1600, "original_height": 1200}}"#;
    collector.on_observation(&api_exchange("https://www.pinterest.com/resource/get/", body));

    let candidates = ctx.candidates();
    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].reference.as_str(),
        "https://i.pinimg.com/originals/ab/cd/big.jpg"
    );
}

#[test]
fn metadata_originals_below_the_floor_are_ignored() {
    let ctx = board_ctx(10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    let body = r#"{"images": {"original": "https:\/\/i.pinimg.com\/originals\/ab\/cd\/small.jpg", "original_width": 400, "original_height": 300}}"#;
    collector.on_observation(&api_exchange("https://www.pinterest.com/resource/get/", body));

    assert_eq!(ctx.candidate_count(), 0);
}

#[test]
fn duplicate_insertion_does_not_reevaluate_relevance() {
    let ctx = query_ctx("lakes", 10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    // Confirm the results view with a payload carrying no identifiers
    collector.on_observation(&api_exchange(
        "https://www.pinterest.com/search/pins/?q=lakes",
        "{}",
    ));
    assert!(ctx.inside_results());

    // First sighting: no identifiers known, stored as non-relevant
    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/736x/ab/cd/812345670abc.jpg",
    ));
    assert!(!ctx.candidates()[0].is_relevant);

    // The identifier arrives later
    ctx.classifier().observe_identifier("812345670");

    // A repeat sighting is a no-op: the stored flag does not upgrade
    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/736x/ab/cd/812345670abc.jpg",
    ));
    let candidates = ctx.candidates();
    assert_eq!(candidates.len(), 1);
    assert!(!candidates[0].is_relevant);
}

#[test]
fn board_images_are_always_relevant() {
    let ctx = board_ctx(10);
    ctx.enable_collection();
    let collector = CandidateCollector::new(Arc::clone(&ctx));

    collector.on_observation(&image_exchange(
        "https://i.pinimg.com/736x/ab/cd/ef/img.jpg",
    ));
    assert!(ctx.candidates()[0].is_relevant);
}
