//! Optional language detection.
//!
//! Detection is a capability: `default_language_detector()` is resolved once at
//! startup and returns `None` when the crate was built without `lang-detect`.
//! Only the language rule consults it.

use std::sync::Arc;

pub trait LanguageDetector: Send + Sync {
    /// Best-guess ISO 639-1 code (`"en"`, `"zh"`, ...) or `None` when undecidable.
    /// Languages without a two-letter code come back as their ISO 639-3 code.
    fn detect(&self, text: &str) -> Option<String>;
}

/// `target` matches `detected` exactly, or as a region/script prefix (`zh` ~ `zh-tw`).
pub fn language_matches(target: &str, detected: &str) -> bool {
    let t = target.trim().to_lowercase();
    let d = detected.trim().to_lowercase();
    d == t || d.strip_prefix(&t).is_some_and(|rest| rest.starts_with('-'))
}

#[cfg(feature = "lang-detect")]
mod whatlang_impl {
    use super::LanguageDetector;

    /// Trigram-based detector backed by `whatlang`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct WhatlangDetector;

    impl LanguageDetector for WhatlangDetector {
        fn detect(&self, text: &str) -> Option<String> {
            let info = whatlang::detect(text)?;
            let code = info.lang().code();
            Some(iso_639_1(code).unwrap_or(code).to_string())
        }
    }

    fn iso_639_1(code3: &str) -> Option<&'static str> {
        Some(match code3 {
            "eng" => "en",
            "cmn" => "zh",
            "spa" => "es",
            "fra" => "fr",
            "deu" => "de",
            "ita" => "it",
            "por" => "pt",
            "rus" => "ru",
            "jpn" => "ja",
            "kor" => "ko",
            "ara" => "ar",
            "hin" => "hi",
            "tur" => "tr",
            "nld" => "nl",
            "pol" => "pl",
            "ukr" => "uk",
            "vie" => "vi",
            "tha" => "th",
            "ind" => "id",
            "swe" => "sv",
            _ => return None,
        })
    }
}

#[cfg(feature = "lang-detect")]
pub use whatlang_impl::WhatlangDetector;

/// The detector available in this build, if any.
pub fn default_language_detector() -> Option<Arc<dyn LanguageDetector>> {
    #[cfg(feature = "lang-detect")]
    {
        Some(Arc::new(WhatlangDetector))
    }
    #[cfg(not(feature = "lang-detect"))]
    {
        None
    }
}
