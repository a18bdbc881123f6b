#[path = "common/mod.rs"]
mod common;

use common::*;
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use ytetl::{
    read_table, write_raw_comments, CleanedComment, Domain, DropReason, DroppedComment, QualityConfig,
    RawComment, YouTubeETL, CLEAN_COLUMNS, DROPPED_COLUMNS,
};

fn sample_rows() -> Vec<RawComment> {
    vec![
        raw("v1", "c1", "  These shoes are super comfortable for daily runs  "),
        raw("v1", "c2", "These shoes are super comfortable for daily runs"),
        raw("v1", "c3", "these shoes are SUPER comfortable for daily runs!!"),
        raw("v1", "c4", "!!!!!"),
        raw("v1", "c5", "Use my promo code for a discount!"),
        raw("v1", "c6", "ok"),
        raw("v2", "c7", "Nice"),
        raw("v2", "c8", "Sizing runs small, see https://brand.example/size-chart"),
        raw("v2", "c9", "@runner99 totally agree with you"),
        raw("v2", "c10", "These shoes are super comfortable for daily runs"),
    ]
}

fn etl(dir: &std::path::Path) -> YouTubeETL {
    YouTubeETL::new().data_dir(dir).progress(false).language_detector(None)
}

/// In-memory clean: dedupe, normalize and classify with reasons.
#[test]
fn clean_comments_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let out = etl(dir.path()).clean_comments(Domain::Sneaker, sample_rows()).unwrap();

    assert_eq!(out.input_rows, 10);
    // c2 equals trimmed c1; c3 is a near duplicate of c1
    assert_eq!(out.dedupe.exact, 1);
    assert_eq!(out.dedupe.near, 1);
    assert_eq!(out.kept.len() + out.dropped.len() + 2, out.input_rows);

    let kept: Vec<&str> = out.kept.iter().map(|c| c.comment_id.as_str()).collect();
    assert_eq!(kept, vec!["c1", "c8", "c9", "c10"]);
    assert_eq!(out.kept[0].clean_text, "These shoes are super comfortable for daily runs");
    assert_eq!(out.kept[1].clean_text, "Sizing runs small, see <URL>");
    assert_eq!(out.kept[2].clean_text, "<USER> totally agree with you");

    let reasons: Vec<(&str, DropReason)> =
        out.dropped.iter().map(|d| (d.comment_id.as_str(), d.dropped_reason)).collect();
    assert_eq!(
        reasons,
        vec![
            ("c4", DropReason::NoiseOnly),
            ("c5", DropReason::SpamLike),
            ("c6", DropReason::TooShort),
            ("c7", DropReason::TooShortWords),
        ]
    );
    let counts = out.reason_counts();
    assert_eq!(counts.values().sum::<usize>(), out.dropped.len());
    assert_eq!(counts.get(&DropReason::SpamLike), Some(&1));
}

/// Two rows under one comment id with different text keep only the first,
/// so ids stay unique in the cleaned table.
#[test]
fn kept_ids_are_unique_for_edited_comments() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        raw("v1", "c1", "These shoes are super comfortable"),
        raw("v1", "c1", "Edited: these fit true to size for me"),
    ];
    let out = etl(dir.path()).clean_comments(Domain::Sneaker, rows).unwrap();

    assert_eq!(out.dedupe.identity, 1);
    assert_eq!(out.kept.len(), 1);
    assert_eq!(out.kept[0].clean_text, "These shoes are super comfortable");
    let ids: HashSet<(&str, &str)> =
        out.kept.iter().map(|c| (c.video_id.as_str(), c.comment_id.as_str())).collect();
    assert_eq!(ids.len(), out.kept.len());
}

/// Every kept row has non-empty text and a consistent length.
#[test]
fn kept_rows_hold_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample_rows();
    for i in 0..50 {
        rows.push(raw("v3", &format!("x{i}"), &format!("comment {i} about the cushioning and fit")));
    }
    let out = etl(dir.path()).clean_comments(Domain::Sneaker, rows).unwrap();

    for c in &out.kept {
        assert!(!c.clean_text.is_empty());
        assert_eq!(c.comment_length, c.clean_text.chars().count());
        assert_eq!(c.domain, Domain::Sneaker);
    }
    for d in &out.dropped {
        assert_eq!(d.comment_length, d.clean_text.chars().count());
    }
    // parallel classification keeps input order
    let xs: Vec<&str> = out.kept.iter().filter(|c| c.video_id == "v3").map(|c| c.comment_id.as_str()).collect();
    let expected: Vec<String> = (0..50).map(|i| format!("x{i}")).collect();
    assert_eq!(xs, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

/// File round trip: raw CSV in, clean and dropped CSVs out with the documented headers.
#[test]
fn clean_writes_both_tables() {
    let dir = tempfile::tempdir().unwrap();
    let etl = etl(dir.path());
    write_raw_comments(&etl.paths().raw_csv(Domain::Sneaker), &sample_rows()).unwrap();

    let report = etl.clean(Domain::Sneaker).unwrap();
    assert_eq!(report.kept, 4);
    assert_eq!(report.dropped, 4);
    assert_eq!(report.input_rows, 10);
    assert_eq!(report.clean_path, dir.path().join("processed").join("sneaker_comments_clean.csv"));
    assert_eq!(report.dropped_path, dir.path().join("processed").join("sneaker_comments_clean_dropped.csv"));

    assert_eq!(read_csv_header(&report.clean_path), CLEAN_COLUMNS);
    assert_eq!(read_csv_header(&report.dropped_path), DROPPED_COLUMNS);

    let kept: Vec<CleanedComment> = read_table(&report.clean_path).unwrap();
    assert_eq!(kept.len(), 4);
    assert!(kept.iter().all(|c| c.domain == Domain::Sneaker));

    let dropped: Vec<DroppedComment> = read_table(&report.dropped_path).unwrap();
    let spam = dropped.iter().find(|d| d.comment_id == "c5").unwrap();
    assert_eq!(spam.dropped_reason, DropReason::SpamLike);
    assert_eq!(spam.text, "Use my promo code for a discount!");

    let raw_rows = read_csv_rows(&report.dropped_path);
    let tags: HashSet<&str> = raw_rows.iter().map(|r| r["dropped_reason"].as_str()).collect();
    assert_eq!(tags, HashSet::from(["noise_only", "spam_like", "too_short", "too_short_words"]));
}

/// With nothing dropped, the dropped table is still written, header only.
#[test]
fn dropped_table_is_written_when_empty() {
    let dir = tempfile::tempdir().unwrap();
    let etl = etl(dir.path());
    let rows = vec![raw("v1", "c1", "Great grip on wet roads"), raw("v1", "c2", "Lasted me two years")];
    write_raw_comments(&etl.paths().raw_csv(Domain::Sneaker), &rows).unwrap();

    let report = etl.clean(Domain::Sneaker).unwrap();
    assert_eq!(report.dropped, 0);
    assert_eq!(read_csv_header(&report.dropped_path), DROPPED_COLUMNS);
    assert!(read_csv_rows(&report.dropped_path).is_empty());
}

/// Raw files from older scripts: missing columns, blank or float like counts.
#[test]
fn tolerant_raw_reading() {
    let dir = tempfile::tempdir().unwrap();
    let etl = etl(dir.path());
    let path = etl.paths().raw_csv(Domain::Food);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "video_id,comment_id,like_count,text\n\
         v1,c1,12.0,This burger was juicy and well seasoned\n\
         v1,c2,,Fries were soggy though\n\
         v1,c3,lots,\"Quoted, with a comma, still tasty\"\n",
    )
    .unwrap();

    let report = etl.clean(Domain::Food).unwrap();
    assert_eq!(report.kept, 3);
    let kept: Vec<CleanedComment> = read_table(&report.clean_path).unwrap();
    assert_eq!(kept[0].like_count, 12);
    assert_eq!(kept[1].like_count, 0);
    assert_eq!(kept[2].like_count, 0);
    assert_eq!(kept[2].clean_text, "Quoted, with a comma, still tasty");
    assert!(kept.iter().all(|c| c.domain == Domain::Food), "missing domain falls back to the file's");
}

/// `clean_all` picks up every domain with a raw file; steam uses its own output name.
#[test]
fn clean_all_discovers_domains() {
    let dir = tempfile::tempdir().unwrap();
    let etl = etl(dir.path());
    let steam_rows = vec![{
        let mut r = raw("g1", "c1", "Runs at a smooth 60fps on my old laptop");
        r.domain = Some(Domain::Steam);
        r
    }];
    write_raw_comments(&etl.paths().raw_csv(Domain::Steam), &steam_rows).unwrap();
    write_raw_comments(&etl.paths().raw_csv(Domain::Sneaker), &sample_rows()).unwrap();
    fs::write(etl.paths().raw_dir.join("notes.csv"), "ignored\n").unwrap();

    let reports = etl.clean_all().unwrap();
    let domains: Vec<Domain> = reports.iter().map(|r| r.domain).collect();
    assert_eq!(domains, vec![Domain::Sneaker, Domain::Steam]);

    let steam = &reports[1];
    assert!(steam.clean_path.ends_with("processed/steam_review_comments_clean.csv"));
    assert!(steam.clean_path.is_file());
    assert_eq!(steam.kept, 1);
}

#[test]
fn clean_without_raw_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = etl(dir.path()).clean(Domain::Pharma).unwrap_err();
    assert!(format!("{err:#}").contains("pharma_comments_raw.csv"));
}

/// Language and domain filters flow through the builder's quality config.
#[test]
fn language_and_domain_filters_apply() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        raw("v1", "c1", "hello, these nike runners are great"),
        raw("v1", "c2", "bonjour, ces nike sont super"),
        raw("v1", "c3", "hello, what a lovely sunset today"),
    ];
    let out = YouTubeETL::new()
        .data_dir(dir.path())
        .progress(false)
        .language_detector(Some(Arc::new(KeywordDetector)))
        .quality(QualityConfig::default().with_target_language("en").with_domain_filter(true))
        .clean_comments(Domain::Sneaker, rows)
        .unwrap();

    assert_eq!(out.kept.len(), 1);
    assert_eq!(out.kept[0].comment_id, "c1");
    let reasons: Vec<DropReason> = out.dropped.iter().map(|d| d.dropped_reason).collect();
    assert_eq!(reasons, vec![DropReason::LangFilter, DropReason::DomainMismatch]);
}
