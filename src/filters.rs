//! Quality rules over normalized comment text, plus the classifier that runs them
//! in priority order and reports the first failure.

use crate::config::{Domain, QualityConfig};
use crate::lang::{language_matches, LanguageDetector};
use crate::model::DropReason;
use crate::normalize::{alpha_word_count, char_len, MENTION_RE, URL_RE, URL_TOKEN, USER_TOKEN};
use crate::query::domain_keywords;
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use std::sync::{Arc, LazyLock};

static ONLY_NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\W_]+$").unwrap());
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());
static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// One named validity check. `passes` must be pure.
pub trait QualityRule: Send + Sync {
    fn reason(&self) -> DropReason;
    fn passes(&self, text: &str) -> bool;
    fn name(&self) -> &'static str {
        self.reason().as_str()
    }
}

pub struct MinLength {
    pub min_chars: usize,
}

impl QualityRule for MinLength {
    fn reason(&self) -> DropReason { DropReason::TooShort }
    fn passes(&self, text: &str) -> bool {
        char_len(text) >= self.min_chars
    }
}

pub struct MaxLength {
    pub max_chars: usize,
}

impl QualityRule for MaxLength {
    fn reason(&self) -> DropReason { DropReason::TooLong }
    fn passes(&self, text: &str) -> bool {
        char_len(text) <= self.max_chars
    }
}

/// Punctuation-only, stuttered, link-only or code-like text.
pub struct NoiseOnly {
    repeat_run: usize,
    code_re: Regex,
    symbol_ratio: f64,
    long_symbolic_len: usize,
}

impl NoiseOnly {
    pub fn new(cfg: &QualityConfig) -> Result<Self> {
        let pattern = format!(r"[{{}}\[\]<>$^*_=~`|\\]{{{},}}", cfg.code_symbol_run.max(1));
        Ok(Self {
            repeat_run: cfg.repeat_run.max(2),
            code_re: Regex::new(&pattern).context("compile code-symbol pattern")?,
            symbol_ratio: cfg.symbol_ratio,
            long_symbolic_len: cfg.long_symbolic_len,
        })
    }

    fn is_noise(&self, text: &str) -> bool {
        if text.trim().is_empty() || ONLY_NON_WORD_RE.is_match(text) {
            return true;
        }
        if has_repeat_run(text, self.repeat_run) {
            return true;
        }
        if strip_links_and_tags(text).trim().is_empty() {
            return true;
        }
        if self.code_re.is_match(text) {
            let len = char_len(text);
            let symbols = SYMBOL_RE.find_iter(text).count();
            let ratio = symbols as f64 / len.max(1) as f64;
            if ratio > self.symbol_ratio || len > self.long_symbolic_len {
                return true;
            }
        }
        false
    }
}

impl QualityRule for NoiseOnly {
    fn reason(&self) -> DropReason { DropReason::NoiseOnly }
    fn passes(&self, text: &str) -> bool {
        !self.is_noise(text)
    }
}

/// True when some character repeats `run` or more times in a row.
pub fn has_repeat_run(text: &str, run: usize) -> bool {
    let mut prev: Option<char> = None;
    let mut count = 0usize;
    for c in text.chars() {
        if Some(c) == prev {
            count += 1;
        } else {
            prev = Some(c);
            count = 1;
        }
        if count >= run {
            return true;
        }
    }
    false
}

fn strip_links_and_tags(text: &str) -> String {
    let t = text.replace(URL_TOKEN, "").replace(USER_TOKEN, "");
    let t = URL_RE.replace_all(&t, "");
    let t = MENTION_RE.replace_all(&t, "");
    HASHTAG_RE.replace_all(&t, "").into_owned()
}

pub struct SpamLike {
    re: Regex,
}

impl SpamLike {
    pub fn new(patterns: &[String]) -> Result<Option<Self>> {
        if patterns.is_empty() {
            return Ok(None);
        }
        let joined = patterns.iter().map(|p| format!("(?:{p})")).collect::<Vec<_>>().join("|");
        let re = RegexBuilder::new(&joined)
            .case_insensitive(true)
            .build()
            .context("compile spam patterns")?;
        Ok(Some(Self { re }))
    }
}

impl QualityRule for SpamLike {
    fn reason(&self) -> DropReason { DropReason::SpamLike }
    fn passes(&self, text: &str) -> bool {
        !self.re.is_match(text)
    }
}

/// Rejects text detected as another language. Undecidable text passes.
pub struct LanguageFilter {
    target: String,
    detector: Arc<dyn LanguageDetector>,
}

impl LanguageFilter {
    pub fn new(target: impl Into<String>, detector: Arc<dyn LanguageDetector>) -> Self {
        Self { target: target.into(), detector }
    }
}

impl QualityRule for LanguageFilter {
    fn reason(&self) -> DropReason { DropReason::LangFilter }
    fn passes(&self, text: &str) -> bool {
        match self.detector.detect(text) {
            Some(lang) => language_matches(&self.target, &lang),
            None => true,
        }
    }
}

pub struct DomainKeywords {
    set: RegexSet,
}

impl DomainKeywords {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let set = RegexSetBuilder::new(patterns.iter().map(|p| p.as_ref()))
            .case_insensitive(true)
            .build()
            .context("compile domain keyword patterns")?;
        Ok(Self { set })
    }
}

impl QualityRule for DomainKeywords {
    fn reason(&self) -> DropReason { DropReason::DomainMismatch }
    fn passes(&self, text: &str) -> bool {
        self.set.is_match(text)
    }
}

/// Weak secondary length check: few real words *and* still short.
pub struct SparseWords {
    pub min_words: usize,
    pub min_chars: usize,
}

impl QualityRule for SparseWords {
    fn reason(&self) -> DropReason { DropReason::TooShortWords }
    fn passes(&self, text: &str) -> bool {
        !(alpha_word_count(text) < self.min_words && char_len(text) < self.min_chars)
    }
}

/// Ordered rule chain; the first failing rule decides the reason.
pub struct QualityClassifier {
    rules: Vec<Box<dyn QualityRule>>,
}

impl QualityClassifier {
    pub fn new(rules: Vec<Box<dyn QualityRule>>) -> Self {
        Self { rules }
    }

    /// Build the standard chain for `domain`.
    ///
    /// The language rule is only installed when a target language is configured
    /// *and* a detector is available; without a detector it is skipped with a warning,
    /// so every other decision is unchanged.
    pub fn from_config(
        cfg: &QualityConfig,
        domain: Domain,
        detector: Option<Arc<dyn LanguageDetector>>,
    ) -> Result<Self> {
        let mut rules: Vec<Box<dyn QualityRule>> = vec![
            Box::new(MinLength { min_chars: cfg.min_chars }),
            Box::new(MaxLength { max_chars: cfg.max_chars }),
            Box::new(NoiseOnly::new(cfg)?),
        ];
        if let Some(spam) = SpamLike::new(&cfg.spam_patterns)? {
            rules.push(Box::new(spam));
        }
        if let Some(target) = cfg.target_language.as_deref() {
            match detector {
                Some(d) => rules.push(Box::new(LanguageFilter::new(target, d))),
                None => tracing::warn!(
                    target_language = target,
                    "language detection unavailable in this build; language filter disabled"
                ),
            }
        }
        if cfg.domain_filter {
            let keywords = match &cfg.domain_keywords {
                Some(custom) => DomainKeywords::new(custom)?,
                None => DomainKeywords::new(domain_keywords(domain))?,
            };
            rules.push(Box::new(keywords));
        }
        rules.push(Box::new(SparseWords {
            min_words: cfg.min_words,
            min_chars: cfg.min_chars_for_words,
        }));
        Ok(Self { rules })
    }

    /// `None` means keep; otherwise the first failing rule's reason.
    pub fn classify(&self, normalized: &str) -> Option<DropReason> {
        self.rules.iter().find(|r| !r.passes(normalized)).map(|r| r.reason())
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}
