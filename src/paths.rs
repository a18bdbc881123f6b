use crate::config::Domain;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// On-disk layout: `<base>/raw` for fetched comments, `<base>/processed` for cleaned output.
#[derive(Clone, Debug)]
pub struct DataPaths {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl DataPaths {
    pub fn new(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref().to_path_buf();
        Self {
            raw_dir: base.join("raw"),
            processed_dir: base.join("processed"),
        }
    }

    pub fn raw_csv(&self, domain: Domain) -> PathBuf {
        self.raw_dir.join(format!("{}_comments_raw.csv", domain))
    }

    pub fn clean_csv(&self, domain: Domain) -> PathBuf {
        self.processed_dir.join(format!("{}.csv", clean_stem(domain)))
    }

    pub fn dropped_csv(&self, domain: Domain) -> PathBuf {
        self.processed_dir.join(format!("{}_dropped.csv", clean_stem(domain)))
    }
}

// Downstream merge scripts expect the steam table under its review-comments name.
fn clean_stem(domain: Domain) -> String {
    match domain {
        Domain::Steam => "steam_review_comments_clean".to_string(),
        d => format!("{}_comments_clean", d),
    }
}

/// Find raw CSVs directly under `raw_dir`, keyed by domain.
/// Files that don't follow the `{domain}_comments_raw.csv` naming are ignored.
pub fn discover_raw(raw_dir: &Path) -> BTreeMap<Domain, PathBuf> {
    let re = Regex::new(r"^([a-z]+)_comments_raw\.csv$").expect("static regex");
    let mut map = BTreeMap::new();
    if !raw_dir.exists() {
        return map;
    }
    for ent in WalkDir::new(raw_dir).min_depth(1).max_depth(1).into_iter().flatten() {
        if !ent.file_type().is_file() {
            continue;
        }
        let Some(name) = ent.file_name().to_str() else { continue };
        if let Some(caps) = re.captures(name) {
            if let Ok(domain) = caps[1].parse::<Domain>() {
                map.insert(domain, ent.path().to_path_buf());
            }
        }
    }
    map
}
