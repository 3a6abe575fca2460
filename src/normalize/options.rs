//! Normalization options and their validated configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single configurable normalization transform.
///
/// Variants are declared in pipeline order; the discriminant is the bit
/// position used by the legacy integer encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationOption {
    /// Fold to lowercase
    Lowercase = 0,
    /// Fold to uppercase
    Uppercase = 1,
    /// Remove URLs and e-mail addresses
    StripMarkup = 2,
    /// Remove a leading run of whitespace and bullet markers
    StripLeadingSymbols = 3,
    /// Full-width letters/digits to half-width
    HalfwidthAlnum = 4,
    /// Half-width letters/digits to full-width
    FullwidthAlnum = 5,
    /// Full-width katakana to half-width
    HalfwidthKana = 6,
    /// Half-width katakana to full-width
    FullwidthKana = 7,
    /// Replace every digit with a zero of the same width
    DigitsToZero = 8,
    /// Remove every digit
    StripDigits = 9,
}

impl NormalizationOption {
    /// All options in pipeline order.
    pub const ALL: [NormalizationOption; 10] = [
        NormalizationOption::Lowercase,
        NormalizationOption::Uppercase,
        NormalizationOption::StripMarkup,
        NormalizationOption::StripLeadingSymbols,
        NormalizationOption::HalfwidthAlnum,
        NormalizationOption::FullwidthAlnum,
        NormalizationOption::HalfwidthKana,
        NormalizationOption::FullwidthKana,
        NormalizationOption::DigitsToZero,
        NormalizationOption::StripDigits,
    ];

    /// Pairs that may never be enabled together.
    pub const EXCLUSIVE_PAIRS: [(NormalizationOption, NormalizationOption); 4] = [
        (NormalizationOption::Lowercase, NormalizationOption::Uppercase),
        (
            NormalizationOption::HalfwidthAlnum,
            NormalizationOption::FullwidthAlnum,
        ),
        (
            NormalizationOption::HalfwidthKana,
            NormalizationOption::FullwidthKana,
        ),
        (
            NormalizationOption::DigitsToZero,
            NormalizationOption::StripDigits,
        ),
    ];

    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            NormalizationOption::Lowercase => "lowercase",
            NormalizationOption::Uppercase => "uppercase",
            NormalizationOption::StripMarkup => "strip_markup",
            NormalizationOption::StripLeadingSymbols => "strip_leading_symbols",
            NormalizationOption::HalfwidthAlnum => "halfwidth_alnum",
            NormalizationOption::FullwidthAlnum => "fullwidth_alnum",
            NormalizationOption::HalfwidthKana => "halfwidth_kana",
            NormalizationOption::FullwidthKana => "fullwidth_kana",
            NormalizationOption::DigitsToZero => "digits_to_zero",
            NormalizationOption::StripDigits => "strip_digits",
        }
    }

    /// Mask of this option in the legacy integer encoding.
    pub fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Whether the transform discards information beyond case or width.
    pub fn is_lossy(self) -> bool {
        matches!(
            self,
            NormalizationOption::DigitsToZero | NormalizationOption::StripDigits
        )
    }
}

impl fmt::Display for NormalizationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NormalizationOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|opt| opt.name() == wanted)
            .ok_or_else(|| Error::InvalidOption(format!("unknown normalization option '{}'", s)))
    }
}

/// Unvalidated normalization switches.
///
/// This is the builder / deserialization form. Turn it into a
/// [`NormalizationConfig`] with [`NormalizationOptions::build`], which rejects
/// contradictory combinations.
///
/// # Example
///
/// ```
/// use pdfsift::NormalizationOptions;
///
/// let config = NormalizationOptions::new()
///     .lowercase()
///     .strip_markup()
///     .build()
///     .unwrap();
/// assert!(config.options().lowercase);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizationOptions {
    /// Fold to lowercase
    pub lowercase: bool,
    /// Fold to uppercase
    pub uppercase: bool,
    /// Remove URLs and e-mail addresses
    pub strip_markup: bool,
    /// Remove a leading run of whitespace and bullet markers
    pub strip_leading_symbols: bool,
    /// Full-width letters/digits to half-width
    pub halfwidth_alnum: bool,
    /// Half-width letters/digits to full-width
    pub fullwidth_alnum: bool,
    /// Full-width katakana to half-width
    pub halfwidth_kana: bool,
    /// Half-width katakana to full-width
    pub fullwidth_kana: bool,
    /// Replace every digit with a zero of the same width
    pub digits_to_zero: bool,
    /// Remove every digit
    pub strip_digits: bool,
}

impl NormalizationOptions {
    /// No transforms beyond the mandatory Unicode canonicalization.
    pub fn new() -> Self {
        Self::default()
    }

    /// The preset the extraction tool has always shipped with
    /// (`0b0010011101`): lowercase, strip markup, strip leading symbols,
    /// half-width alphanumerics, full-width kana.
    pub fn legacy_preset() -> Self {
        Self::new()
            .lowercase()
            .strip_markup()
            .strip_leading_symbols()
            .halfwidth_alnum()
            .fullwidth_kana()
    }

    /// Decode the legacy integer encoding (bit 0 = lowercase … bit 9 = strip digits).
    pub fn from_bits(bits: u16) -> Result<Self> {
        let known = NormalizationOption::ALL
            .iter()
            .fold(0u16, |acc, opt| acc | opt.bit());
        if bits & !known != 0 {
            return Err(Error::InvalidOption(format!(
                "bit mask {:#b} sets bits outside 0..=9",
                bits
            )));
        }

        let mut options = Self::new();
        for opt in NormalizationOption::ALL {
            if bits & opt.bit() != 0 {
                options.set(opt, true);
            }
        }
        Ok(options)
    }

    /// Encode into the legacy integer form.
    pub fn to_bits(&self) -> u16 {
        self.enabled().fold(0, |acc, opt| acc | opt.bit())
    }

    /// Parse a comma-separated list of option names. `none` or an empty
    /// string yields no options.
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut options = Self::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if name.eq_ignore_ascii_case("none") {
                continue;
            }
            options.set(name.parse()?, true);
        }
        Ok(options)
    }

    /// Check whether an option is switched on.
    pub fn is_enabled(&self, option: NormalizationOption) -> bool {
        match option {
            NormalizationOption::Lowercase => self.lowercase,
            NormalizationOption::Uppercase => self.uppercase,
            NormalizationOption::StripMarkup => self.strip_markup,
            NormalizationOption::StripLeadingSymbols => self.strip_leading_symbols,
            NormalizationOption::HalfwidthAlnum => self.halfwidth_alnum,
            NormalizationOption::FullwidthAlnum => self.fullwidth_alnum,
            NormalizationOption::HalfwidthKana => self.halfwidth_kana,
            NormalizationOption::FullwidthKana => self.fullwidth_kana,
            NormalizationOption::DigitsToZero => self.digits_to_zero,
            NormalizationOption::StripDigits => self.strip_digits,
        }
    }

    /// Switch an option on or off.
    pub fn set(&mut self, option: NormalizationOption, enabled: bool) {
        let field = match option {
            NormalizationOption::Lowercase => &mut self.lowercase,
            NormalizationOption::Uppercase => &mut self.uppercase,
            NormalizationOption::StripMarkup => &mut self.strip_markup,
            NormalizationOption::StripLeadingSymbols => &mut self.strip_leading_symbols,
            NormalizationOption::HalfwidthAlnum => &mut self.halfwidth_alnum,
            NormalizationOption::FullwidthAlnum => &mut self.fullwidth_alnum,
            NormalizationOption::HalfwidthKana => &mut self.halfwidth_kana,
            NormalizationOption::FullwidthKana => &mut self.fullwidth_kana,
            NormalizationOption::DigitsToZero => &mut self.digits_to_zero,
            NormalizationOption::StripDigits => &mut self.strip_digits,
        };
        *field = enabled;
    }

    /// Enabled options in pipeline order.
    pub fn enabled(&self) -> impl Iterator<Item = NormalizationOption> + '_ {
        NormalizationOption::ALL
            .into_iter()
            .filter(move |opt| self.is_enabled(*opt))
    }

    /// Enable an option and return self.
    pub fn with(mut self, option: NormalizationOption) -> Self {
        self.set(option, true);
        self
    }

    /// Enable lowercase folding.
    pub fn lowercase(self) -> Self {
        self.with(NormalizationOption::Lowercase)
    }

    /// Enable uppercase folding.
    pub fn uppercase(self) -> Self {
        self.with(NormalizationOption::Uppercase)
    }

    /// Enable URL / e-mail removal.
    pub fn strip_markup(self) -> Self {
        self.with(NormalizationOption::StripMarkup)
    }

    /// Enable leading-symbol removal.
    pub fn strip_leading_symbols(self) -> Self {
        self.with(NormalizationOption::StripLeadingSymbols)
    }

    /// Enable full-width → half-width alphanumerics.
    pub fn halfwidth_alnum(self) -> Self {
        self.with(NormalizationOption::HalfwidthAlnum)
    }

    /// Enable half-width → full-width alphanumerics.
    pub fn fullwidth_alnum(self) -> Self {
        self.with(NormalizationOption::FullwidthAlnum)
    }

    /// Enable full-width → half-width katakana.
    pub fn halfwidth_kana(self) -> Self {
        self.with(NormalizationOption::HalfwidthKana)
    }

    /// Enable half-width → full-width katakana.
    pub fn fullwidth_kana(self) -> Self {
        self.with(NormalizationOption::FullwidthKana)
    }

    /// Enable digit zeroing.
    pub fn digits_to_zero(self) -> Self {
        self.with(NormalizationOption::DigitsToZero)
    }

    /// Enable digit removal.
    pub fn strip_digits(self) -> Self {
        self.with(NormalizationOption::StripDigits)
    }

    /// Validate and freeze into a [`NormalizationConfig`].
    pub fn build(self) -> Result<NormalizationConfig> {
        NormalizationConfig::new(self)
    }
}

impl fmt::Display for NormalizationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.enabled().map(NormalizationOption::name).collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(","))
        }
    }
}

/// A validated, immutable set of normalization options.
///
/// No exclusive pair is ever enabled in a value of this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationConfig {
    options: NormalizationOptions,
}

impl NormalizationConfig {
    /// Validate `options`, failing on the first exclusive pair found.
    pub fn new(options: NormalizationOptions) -> Result<Self> {
        for (first, second) in NormalizationOption::EXCLUSIVE_PAIRS {
            if options.is_enabled(first) && options.is_enabled(second) {
                return Err(Error::Configuration {
                    first: first.name(),
                    second: second.name(),
                });
            }
        }
        Ok(Self { options })
    }

    /// Build from the legacy integer encoding.
    pub fn from_bits(bits: u16) -> Result<Self> {
        Self::new(NormalizationOptions::from_bits(bits)?)
    }

    /// The underlying switches.
    pub fn options(&self) -> &NormalizationOptions {
        &self.options
    }

    /// Check whether an option is switched on.
    pub fn is_enabled(&self, option: NormalizationOption) -> bool {
        self.options.is_enabled(option)
    }

    /// Whether any enabled option discards digits.
    pub fn is_lossy(&self) -> bool {
        self.options.enabled().any(NormalizationOption::is_lossy)
    }
}

impl TryFrom<NormalizationOptions> for NormalizationConfig {
    type Error = Error;

    fn try_from(options: NormalizationOptions) -> Result<Self> {
        Self::new(options)
    }
}

impl fmt::Display for NormalizationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.options.fmt(f)
    }
}
