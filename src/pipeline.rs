use crate::config::{Domain, ETLOptions, FetchOptions, QualityConfig};
use crate::csv_io::{read_table, write_raw_comments, write_table};
use crate::dedupe::{dedupe_comments, DedupeStats};
use crate::fetch::{CommentFetcher, FetchReport};
use crate::filters::QualityClassifier;
use crate::lang::{default_language_detector, LanguageDetector};
use crate::model::{
    CleanedComment, DropReason, DroppedComment, RawComment, Verdict, CLEAN_COLUMNS, DROPPED_COLUMNS,
};
use crate::normalize::normalize;
use crate::paths::{discover_raw, DataPaths};
use crate::progress::ProgressScope;
use crate::query::preset_queries;
use crate::util::init_tracing_once;
use crate::youtube::VideoApi;
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct YouTubeETL {
    pub(crate) opts: ETLOptions,
    detector: Option<Arc<dyn LanguageDetector>>,
}

/// In-memory result of cleaning one domain's rows.
#[derive(Clone, Debug, Default)]
pub struct CleanOutput {
    pub kept: Vec<CleanedComment>,
    pub dropped: Vec<DroppedComment>,
    pub dedupe: DedupeStats,
    pub input_rows: usize,
}

impl CleanOutput {
    pub fn reason_counts(&self) -> BTreeMap<DropReason, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.dropped {
            *counts.entry(d.dropped_reason).or_insert(0) += 1;
        }
        counts
    }
}

/// Summary of a clean run for one domain.
#[derive(Clone, Debug)]
pub struct CleanReport {
    pub domain: Domain,
    pub input_rows: usize,
    pub dedupe: DedupeStats,
    pub kept: usize,
    pub dropped: usize,
    pub reasons: BTreeMap<DropReason, usize>,
    pub clean_path: PathBuf,
    pub dropped_path: PathBuf,
}

impl Default for YouTubeETL {
    fn default() -> Self {
        Self::new()
    }
}

impl YouTubeETL {
    pub fn new() -> Self {
        Self { opts: ETLOptions::default(), detector: default_language_detector() }
    }

    // -------- Builder methods --------
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_data_dir(dir); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn fetch_options(mut self, fetch: FetchOptions) -> Self { self.opts.fetch = fetch; self }
    pub fn quality(mut self, quality: QualityConfig) -> Self { self.opts.quality = quality; self }
    /// Replace the build's default detector; `None` turns the language rule off.
    pub fn language_detector(mut self, detector: Option<Arc<dyn LanguageDetector>>) -> Self { self.detector = detector; self }

    pub fn options(&self) -> &ETLOptions { &self.opts }
    pub fn paths(&self) -> &DataPaths { &self.opts.paths }

    // -------- Fetch --------

    /// Discover and fetch comments for `domain`, checkpointing into the raw CSV.
    pub fn fetch<A: VideoApi + ?Sized>(&self, domain: Domain, api: &A) -> Result<FetchReport> {
        init_tracing_once();
        let out = self.opts.paths.raw_csv(domain);
        let queries = preset_queries(domain);
        tracing::info!(%domain, queries = queries.len(), out = %out.display(), "fetching");

        CommentFetcher::new(api, &self.opts.fetch)
            .progress(self.opts.progress)
            .run(domain, queries, |rows| {
                write_raw_comments(&out, rows.iter().copied())
                    .with_context(|| format!("write raw comments {}", out.display()))
            })
    }

    // -------- Clean --------

    /// Dedupe, normalize and classify rows in memory. Output order follows input order.
    pub fn clean_comments(&self, domain: Domain, rows: Vec<RawComment>) -> Result<CleanOutput> {
        let classifier = QualityClassifier::from_config(&self.opts.quality, domain, self.detector.clone())
            .context("build quality rules")?;
        tracing::debug!(%domain, rules = ?classifier.rule_names(), "quality rules");

        let input_rows = rows.len();
        let rows: Vec<RawComment> = rows
            .into_iter()
            .map(|mut r| {
                let trimmed = r.text.trim();
                if trimmed.len() != r.text.len() {
                    r.text = trimmed.to_string();
                }
                r
            })
            .collect();
        let (rows, dedupe) = dedupe_comments(rows);
        tracing::info!(
            %domain,
            input_rows,
            exact = dedupe.exact,
            near = dedupe.near,
            identity = dedupe.identity,
            "deduplicated"
        );

        let pb = ProgressScope::count(format!("Cleaning {domain}"), rows.len() as u64, self.opts.progress);
        let verdicts: Vec<Verdict> = rows
            .par_iter()
            .map(|raw| {
                let v = clean_one(&classifier, raw, domain);
                pb.inc(1);
                v
            })
            .collect();
        pb.finish(format!("Cleaned {domain}"));

        let mut out = CleanOutput { dedupe, input_rows, ..Default::default() };
        for v in verdicts {
            match v {
                Verdict::Kept(c) => out.kept.push(c),
                Verdict::Dropped(d) => out.dropped.push(d),
            }
        }
        Ok(out)
    }

    /// Clean `raw/{domain}_comments_raw.csv` into the processed directory.
    pub fn clean(&self, domain: Domain) -> Result<CleanReport> {
        init_tracing_once();
        let src = self.opts.paths.raw_csv(domain);
        if !src.is_file() {
            bail!("raw comments for {domain} not found at {} (run fetch first)", src.display());
        }
        let rows: Vec<RawComment> = read_table(&src)?;
        self.clean_rows_to_disk(domain, rows)
    }

    /// Clean every domain that has a raw CSV, in domain order.
    pub fn clean_all(&self) -> Result<Vec<CleanReport>> {
        init_tracing_once();
        let found = discover_raw(&self.opts.paths.raw_dir);
        if found.is_empty() {
            tracing::warn!(raw_dir = %self.opts.paths.raw_dir.display(), "no raw comment files found");
        }
        let mut reports = Vec::with_capacity(found.len());
        for (domain, path) in found {
            let rows: Vec<RawComment> = read_table(&path)?;
            reports.push(self.clean_rows_to_disk(domain, rows)?);
        }
        Ok(reports)
    }

    fn clean_rows_to_disk(&self, domain: Domain, rows: Vec<RawComment>) -> Result<CleanReport> {
        let out = self.clean_comments(domain, rows)?;
        let clean_path = self.opts.paths.clean_csv(domain);
        let dropped_path = self.opts.paths.dropped_csv(domain);

        let kept = write_table(&clean_path, CLEAN_COLUMNS, &out.kept)
            .with_context(|| format!("write cleaned comments {}", clean_path.display()))?;
        let dropped = write_table(&dropped_path, DROPPED_COLUMNS, &out.dropped)
            .with_context(|| format!("write dropped comments {}", dropped_path.display()))?;

        let reasons = out.reason_counts();
        tracing::info!(%domain, kept, dropped, out = %clean_path.display(), "clean finished");
        Ok(CleanReport {
            domain,
            input_rows: out.input_rows,
            dedupe: out.dedupe,
            kept,
            dropped,
            reasons,
            clean_path,
            dropped_path,
        })
    }
}

fn clean_one(classifier: &QualityClassifier, raw: &RawComment, fallback: Domain) -> Verdict {
    let clean_text = normalize(&raw.text);
    let domain = raw.domain.unwrap_or(fallback);
    match classifier.classify(&clean_text) {
        None => Verdict::Kept(CleanedComment::new(raw, clean_text, domain)),
        Some(reason) => Verdict::Dropped(DroppedComment::new(raw, clean_text, domain, reason)),
    }
}
