//! Tests for resolution-tier analysis and rewriting

use pinharvest::harvest::resolution::{
    Normalized, is_micro_thumbnail, looks_like_tiered_raster, normalize, tier_score,
};
use pinharvest::harvest::types::MediaReference;
use proptest::prelude::*;

fn full(result: Normalized) -> MediaReference {
    match result {
        Normalized::Full(reference) => reference,
        Normalized::Rejected => panic!("expected a normalized reference, got Rejected"),
    }
}

#[test]
fn originals_pass_through_unchanged() {
    let url = "https://i.pinimg.com/originals/ab/cd/ef/abcdef123456.jpg";
    assert_eq!(full(normalize(url, 800, 800)).as_str(), url);
}

#[test]
fn intermediate_tier_rewrites_to_originals() {
    let result = full(normalize(
        "https://i.pinimg.com/236x/ab/cd/ef/img.jpg",
        800,
        800,
    ));
    assert_eq!(
        result.as_str(),
        "https://i.pinimg.com/originals/ab/cd/ef/img.jpg"
    );
}

#[test]
fn every_known_tier_rewrites_to_originals() {
    for tier in ["236x", "474x", "736x", "1200x"] {
        let url = format!("https://i.pinimg.com/{tier}/ab/cd/ef/img.png");
        let result = full(normalize(&url, 800, 800));
        assert!(
            result.as_str().contains("/originals/"),
            "{tier} did not rewrite: {result}"
        );
    }
}

#[test]
fn unknown_sized_folder_rewrites_to_originals() {
    let result = full(normalize(
        "https://i.pinimg.com/564x/ab/cd/ef/abcdef.webp",
        800,
        800,
    ));
    assert_eq!(
        result.as_str(),
        "https://i.pinimg.com/originals/ab/cd/ef/abcdef.webp"
    );
}

#[test]
fn unrecognized_address_passes_through() {
    let url = "https://example.com/photos/full.jpg";
    assert_eq!(full(normalize(url, 800, 800)).as_str(), url);
}

#[test]
fn micro_thumbnail_rejected_when_floor_exceeds_it() {
    for tier in ["60x60", "75x75"] {
        let url = format!("https://i.pinimg.com/{tier}/ab/cd/ef/avatar.jpg");
        assert_eq!(normalize(&url, 800, 800), Normalized::Rejected);
    }
}

#[test]
fn micro_thumbnail_kept_under_small_floor() {
    let url = "https://i.pinimg.com/60x60/ab/cd/ef/avatar.jpg";
    assert_eq!(full(normalize(url, 100, 100)).as_str(), url);
}

#[test]
fn micro_thumbnail_detection() {
    assert!(is_micro_thumbnail(
        "https://i.pinimg.com/75x75/aa/bb/cc/x.jpg"
    ));
    assert!(!is_micro_thumbnail(
        "https://i.pinimg.com/736x/aa/bb/cc/x.jpg"
    ));
}

#[test]
fn tiered_raster_requires_extension_and_tier() {
    assert!(looks_like_tiered_raster(
        "https://i.pinimg.com/736x/aa/bb/cc/x.jpg"
    ));
    assert!(looks_like_tiered_raster(
        "https://i.pinimg.com/originals/aa/bb/cc/x.webp"
    ));
    // No raster extension
    assert!(!looks_like_tiered_raster(
        "https://i.pinimg.com/736x/aa/bb/cc/clip.mp4"
    ));
    // Raster extension but no known tier or host
    assert!(!looks_like_tiered_raster("https://example.com/photo.jpg"));
}

#[test]
fn tier_scores_are_strictly_ordered() {
    let urls = [
        "https://i.pinimg.com/originals/a.jpg",
        "https://i.pinimg.com/1200x/a.jpg",
        "https://i.pinimg.com/736x/a.jpg",
        "https://i.pinimg.com/474x/a.jpg",
        "https://i.pinimg.com/236x/a.jpg",
        "https://example.com/a.jpg",
    ];
    let scores: Vec<u8> = urls.iter().map(|u| tier_score(u)).collect();
    assert_eq!(scores, vec![5, 4, 3, 2, 1, 0]);
}

proptest! {
    /// Normalizing twice never changes the result again.
    #[test]
    fn normalize_is_idempotent(
        tier in prop::sample::select(vec!["60x60", "75x75", "236x", "474x", "736x", "1200x", "originals", "564x"]),
        a in "[0-9a-f]{2}",
        b in "[0-9a-f]{2}",
        name in "[0-9a-f]{8,12}",
        ext in prop::sample::select(vec!["jpg", "jpeg", "png", "webp"]),
    ) {
        let url = format!("https://i.pinimg.com/{tier}/{a}/{b}/{name}.{ext}");
        match normalize(&url, 800, 800) {
            Normalized::Full(once) => {
                let twice = match normalize(once.as_str(), 800, 800) {
                    Normalized::Full(r) => r,
                    Normalized::Rejected => panic!("normalized form was rejected: {once}"),
                };
                prop_assert_eq!(once, twice);
            }
            Normalized::Rejected => {
                // Only the micro tiers reject under a 800x800 floor
                prop_assert!(url.contains("/60x60/") || url.contains("/75x75/"));
            }
        }
    }
}
