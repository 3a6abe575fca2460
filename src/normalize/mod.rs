//! Text normalization pipeline for extracted segments.
//!
//! Every call starts with NFKC canonicalization, then applies the enabled
//! transforms in a fixed order:
//!
//! 1. case folding (`lowercase` / `uppercase`)
//! 2. URL and e-mail removal (`strip_markup`)
//! 3. leading symbol removal (`strip_leading_symbols`)
//! 4. alphanumeric width (`halfwidth_alnum` / `fullwidth_alnum`)
//! 5. kana width (`halfwidth_kana` / `fullwidth_kana`)
//! 6. digits (`digits_to_zero` / `strip_digits`)

mod options;
pub mod width;

pub use options::{NormalizationConfig, NormalizationOption, NormalizationOptions};

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Compiled normalization pipeline.
///
/// Construction never fails: the configuration was validated when the
/// [`NormalizationConfig`] was built.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizationConfig,
    url_regex: Regex,
    email_regex: Regex,
    leading_symbols_regex: Regex,
}

impl Normalizer {
    /// Create a normalizer for a validated configuration.
    pub fn new(config: NormalizationConfig) -> Self {
        Self {
            config,
            // `A-z` spans `[ \ ] ^ _` and the backtick as well as both cases
            url_regex: Regex::new(r"https?://[A-z0-9./?=\-+_: @]*").expect("URL pattern"),
            email_regex: Regex::new(r"[A-z0-9./?=\-+_:]*@[A-z0-9./?=\-+_:]*")
                .expect("e-mail pattern"),
            leading_symbols_regex: Regex::new(r"^[\s□■○●*＊・•◆◇▪▫►▻]*")
                .expect("leading symbol pattern"),
        }
    }

    /// The configuration this pipeline runs.
    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    /// Run the pipeline over one string.
    pub fn clean(&self, text: &str) -> String {
        let opts = self.config.options();

        let mut result: String = text.nfkc().collect();

        if opts.lowercase {
            result = result.to_lowercase();
        }
        if opts.uppercase {
            result = result.to_uppercase();
        }

        if opts.strip_markup {
            result = self.url_regex.replace_all(&result, "").into_owned();
            result = self.email_regex.replace_all(&result, "").into_owned();
        }

        if opts.strip_leading_symbols {
            result = self
                .leading_symbols_regex
                .replace(&result, "")
                .into_owned();
        }

        if opts.halfwidth_alnum {
            result = width::to_halfwidth_alnum(&result);
        }
        if opts.fullwidth_alnum {
            result = width::to_fullwidth_alnum(&result);
        }

        if opts.halfwidth_kana {
            result = width::to_halfwidth_kana(&result);
        }
        if opts.fullwidth_kana {
            result = width::to_fullwidth_kana(&result);
        }

        if opts.digits_to_zero {
            result = width::zero_digits(&result);
        }
        if opts.strip_digits {
            result = width::strip_digits(&result);
        }

        result
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizationConfig::default())
    }
}

/// One-shot convenience wrapper around [`Normalizer::clean`].
///
/// Compiles the pipeline on every call; hold a [`Normalizer`] when cleaning
/// many strings.
pub fn clean(text: &str, config: &NormalizationConfig) -> String {
    Normalizer::new(*config).clean(text)
}
