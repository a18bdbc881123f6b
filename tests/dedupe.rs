#[path = "common/mod.rs"]
mod common;

use common::*;
use std::collections::HashSet;
use ytetl::{dedupe_by_identity, dedupe_comments, near_duplicate_key, DedupeStats};

/// Exact and near duplicates within a video collapse to the first occurrence.
#[test]
fn exact_then_near_keeps_first() {
    let rows = vec![
        raw("v1", "c1", "Great shoe!"),
        raw("v1", "c2", "great shoe"),
        raw("v1", "c3", "Great shoe!"),
        raw("v1", "c4", "Runs a bit small"),
        raw("v2", "c5", "Great shoe!"),
    ];
    let (out, stats) = dedupe_comments(rows);

    assert_eq!(stats, DedupeStats { exact: 1, near: 1, identity: 0 });
    let ids: Vec<&str> = out.iter().map(|r| r.comment_id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c4", "c5"], "first occurrence kept, order preserved");
}

/// No two survivors share a video and a near-duplicate key.
#[test]
fn survivors_have_unique_near_keys() {
    let texts = [
        "Love   these!!", "love these", "LOVE THESE.", "Too narrow for me", "too narrow, for me",
        "Would buy again", "would buy again?", "Comfy", "comfy!!!",
    ];
    let rows: Vec<_> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| raw(if i % 2 == 0 { "a" } else { "b" }, &format!("c{i}"), t))
        .collect();
    let input = rows.len();
    let (out, stats) = dedupe_comments(rows);

    let mut seen = HashSet::new();
    for r in &out {
        assert!(seen.insert((r.video_id.clone(), near_duplicate_key(&r.text))));
    }
    assert_eq!(out.len() + stats.exact + stats.near + stats.identity, input);
}

#[test]
fn near_key_folds_case_and_punctuation() {
    assert_eq!(near_duplicate_key("  Great,   shoe!! "), "great shoe");
    assert_eq!(near_duplicate_key("ÜBER bequem!"), "über bequem");
    assert_eq!(near_duplicate_key("snake_case stays"), "snake_case stays");
}

/// A comment edited between runs shares its id but not its text; only the
/// first copy survives the full pass chain.
#[test]
fn same_id_with_different_text_collapses() {
    let rows = vec![
        raw("v1", "c1", "These shoes are super comfortable"),
        raw("v1", "c1", "Edited: these fit true to size for me"),
        raw("v2", "c1", "Same id under another video is a different comment"),
    ];
    let (out, stats) = dedupe_comments(rows);
    assert_eq!(stats, DedupeStats { exact: 0, near: 0, identity: 1 });
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].text, "These shoes are super comfortable");
    assert_eq!(out[1].video_id, "v2");
}

/// Identity dedupe keeps the first row per `(video_id, comment_id)`.
#[test]
fn identity_dedupe() {
    let rows = vec![
        raw("v1", "c1", "first"),
        raw("v1", "c1", "refetched copy"),
        raw("v2", "c1", "same id, other video"),
    ];
    let out = dedupe_by_identity(&rows);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].text, "first");
    assert_eq!(out[1].video_id, "v2");
}
