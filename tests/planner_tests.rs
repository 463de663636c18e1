//! Tests for selection planning: partitioning, ranking, and bounding

use pinharvest::harvest::planner::plan;
use pinharvest::harvest::types::{Candidate, MediaReference};

fn candidate(url: &str, is_relevant: bool) -> Candidate {
    Candidate {
        reference: MediaReference::from(url),
        is_relevant,
    }
}

#[test]
fn plan_never_exceeds_limit() {
    let candidates: Vec<Candidate> = (0..20)
        .map(|i| {
            candidate(
                &format!("https://i.pinimg.com/originals/{i}.jpg"),
                i % 2 == 0,
            )
        })
        .collect();

    for limit in [0, 1, 5, 20, 50] {
        assert!(plan(&candidates, limit, false).len() <= limit);
    }
}

#[test]
fn plan_fills_from_others_when_relevant_is_short() {
    let mut candidates = vec![candidate("https://i.pinimg.com/originals/r0.jpg", true)];
    for i in 0..5 {
        candidates.push(candidate(
            &format!("https://i.pinimg.com/originals/o{i}.jpg"),
            false,
        ));
    }

    // One relevant, five others, limit three: exactly three selected
    let planned = plan(&candidates, 3, false);
    assert_eq!(planned.len(), 3);
    assert!(planned.iter().any(|r| r.as_str().contains("/r0.jpg")));
}

#[test]
fn plan_prefers_relevant_when_enough_exist() {
    let candidates = vec![
        candidate("https://i.pinimg.com/originals/r0.jpg", true),
        candidate("https://i.pinimg.com/originals/r1.jpg", true),
        candidate("https://i.pinimg.com/originals/o0.jpg", false),
    ];

    let planned = plan(&candidates, 2, false);
    assert_eq!(planned.len(), 2);
    assert!(planned.iter().all(|r| r.as_str().contains("/r")));
}

#[test]
fn permissive_mode_uses_the_union() {
    let candidates = vec![
        candidate("https://i.pinimg.com/originals/r0.jpg", true),
        candidate("https://i.pinimg.com/originals/o0.jpg", false),
        candidate("https://i.pinimg.com/originals/o1.jpg", false),
    ];

    let planned = plan(&candidates, 10, true);
    assert_eq!(planned.len(), 3);
}

#[test]
fn higher_tiers_download_first() {
    let candidates = vec![
        candidate("https://i.pinimg.com/236x/low.jpg", true),
        candidate("https://i.pinimg.com/originals/top.jpg", true),
        candidate("https://i.pinimg.com/736x/mid.jpg", true),
    ];

    let planned = plan(&candidates, 3, false);
    let order: Vec<&str> = planned.iter().map(|r| r.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "https://i.pinimg.com/originals/top.jpg",
            "https://i.pinimg.com/736x/mid.jpg",
            "https://i.pinimg.com/236x/low.jpg",
        ]
    );
}

#[test]
fn relevant_original_beats_other_thumbnail() {
    // One relevant original and one non-relevant thumbnail, limit one
    let candidates = vec![
        candidate("https://i.pinimg.com/originals/a.jpg", true),
        candidate("https://i.pinimg.com/236x/b.jpg", false),
    ];

    let planned = plan(&candidates, 1, false);
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].as_str(), "https://i.pinimg.com/originals/a.jpg");
}

#[test]
fn fill_from_others_is_chosen_by_tier_priority() {
    let mut candidates = vec![candidate("https://i.pinimg.com/236x/r0.jpg", true)];
    candidates.push(candidate("https://i.pinimg.com/236x/o_low.jpg", false));
    candidates.push(candidate("https://i.pinimg.com/originals/o_top.jpg", false));
    candidates.push(candidate("https://i.pinimg.com/1200x/o_high.jpg", false));
    candidates.push(candidate("https://i.pinimg.com/474x/o_mid.jpg", false));
    candidates.push(candidate("https://example.com/o_unknown.jpg", false));

    let planned = plan(&candidates, 3, false);
    assert_eq!(planned.len(), 3);
    // The single relevant entry survives and the remainder comes from
    // the highest-tier others
    assert!(planned.iter().any(|r| r.as_str().contains("r0")));
    assert!(planned.iter().any(|r| r.as_str().contains("o_top")));
    assert!(planned.iter().any(|r| r.as_str().contains("o_high")));
}

#[test]
fn empty_candidate_set_plans_nothing() {
    assert!(plan(&[], 10, false).is_empty());
    assert!(plan(&[], 10, true).is_empty());
}
