//! Locale-aware display strings for amounts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::find_currency;

/// Upper bound on fraction digits, matching what number formatters accept.
const MAX_FRACTION_DIGITS: u8 = 20;

/// Number layout conventions used for the symbol-only rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "fr-FR")]
    FrFr,
    #[serde(rename = "ja-JP")]
    JaJp,
}

impl Locale {
    fn group_separator(self) -> &'static str {
        match self {
            Locale::EnUs | Locale::JaJp => ",",
            Locale::DeDe => ".",
            Locale::FrFr => "\u{202f}",
        }
    }

    fn decimal_separator(self) -> &'static str {
        match self {
            Locale::EnUs | Locale::JaJp => ".",
            Locale::DeDe | Locale::FrFr => ",",
        }
    }

    fn symbol_first(self) -> bool {
        matches!(self, Locale::EnUs | Locale::JaJp)
    }
}

impl std::str::FromStr for Locale {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "en-us" | "en" => Ok(Locale::EnUs),
            "de-de" | "de" => Ok(Locale::DeDe),
            "fr-fr" | "fr" => Ok(Locale::FrFr),
            "ja-jp" | "ja" => Ok(Locale::JaJp),
            _ => Err(format!("Unknown locale: {}", s)),
        }
    }
}

/// Options accepted by [`format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FormatOptions {
    pub show_symbol: bool,
    pub show_code: bool,
    /// Overrides the currency's decimal places as the minimum.
    pub minimum_fraction_digits: Option<u8>,
    /// Overrides the currency's decimal places as the maximum.
    pub maximum_fraction_digits: Option<u8>,
    pub locale: Locale,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_symbol: true,
            show_code: false,
            minimum_fraction_digits: None,
            maximum_fraction_digits: None,
            locale: Locale::EnUs,
        }
    }
}

impl FormatOptions {
    /// Resolves `(min, max)` fraction digits; `max` never drops below `min`.
    fn fraction_digits(&self, decimal_places: u8) -> (usize, usize) {
        let max = self
            .maximum_fraction_digits
            .unwrap_or(decimal_places.max(self.minimum_fraction_digits.unwrap_or(0)))
            .min(MAX_FRACTION_DIGITS);
        let min = self
            .minimum_fraction_digits
            .unwrap_or(decimal_places.min(max))
            .min(MAX_FRACTION_DIGITS);
        (min as usize, max.max(min) as usize)
    }
}

/// Renders `amount` in the currency identified by `code`.
///
/// Unknown codes fall back to `"<amount with 2 decimals> <code>"`.
pub fn format(amount: f64, code: &str, options: &FormatOptions) -> String {
    let Some(currency) = find_currency(code) else {
        return format!("{:.2} {}", amount, code);
    };

    let (min, max) = options.fraction_digits(currency.decimal_places);
    let digits = Digits::new(amount, min, max);

    match (options.show_symbol, options.show_code) {
        (true, false) => digits.localized(currency.symbol, options.locale),
        (false, true) => format!("{} {}", digits.plain(), currency.code),
        (true, true) => format!("{}{} {}", currency.symbol, digits.plain(), currency.code),
        (false, false) => digits.plain(),
    }
}

/// An amount split into sign, integer and fraction digits.
struct Digits {
    negative: bool,
    integer: String,
    fraction: String,
}

impl Digits {
    fn new(amount: f64, min: usize, max: usize) -> Self {
        let rendered = format!("{:.*}", max, amount.abs());
        let (integer, mut fraction) = match rendered.split_once('.') {
            Some((i, f)) => (i.to_string(), f.to_string()),
            None => (rendered.clone(), String::new()),
        };
        while fraction.len() > min && fraction.ends_with('0') {
            fraction.pop();
        }

        // No "-0.00": the sign only shows when a non-zero digit survives rounding.
        let negative = amount.is_sign_negative()
            && rendered.chars().any(|c| c.is_ascii_digit() && c != '0');

        Self {
            negative,
            integer,
            fraction,
        }
    }

    fn sign(&self) -> &'static str {
        if self.negative { "-" } else { "" }
    }

    fn plain(&self) -> String {
        if self.fraction.is_empty() {
            format!("{}{}", self.sign(), self.integer)
        } else {
            format!("{}{}.{}", self.sign(), self.integer, self.fraction)
        }
    }

    fn grouped(&self, separator: &str) -> String {
        if !self.integer.bytes().all(|b| b.is_ascii_digit()) {
            return self.integer.clone();
        }
        let len = self.integer.len();
        let mut out = String::with_capacity(len + len / 3 * separator.len());
        for (i, ch) in self.integer.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push_str(separator);
            }
            out.push(ch);
        }
        out
    }

    fn localized(&self, symbol: &str, locale: Locale) -> String {
        let mut number = self.grouped(locale.group_separator());
        if !self.fraction.is_empty() {
            number.push_str(locale.decimal_separator());
            number.push_str(&self.fraction);
        }

        if locale.symbol_first() {
            format!("{}{}{}", self.sign(), symbol, number)
        } else {
            format!("{}{}\u{a0}{}", self.sign(), number, symbol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(amount: f64, code: &str) -> String {
        format(amount, code, &FormatOptions::default())
    }

    #[test]
    fn test_usd_two_fraction_digits() {
        assert_eq!(fmt(29.99, "USD"), "$29.99");
        assert_eq!(fmt(5.0, "USD"), "$5.00");
    }

    #[test]
    fn test_jpy_zero_fraction_digits() {
        assert_eq!(fmt(29.99, "JPY"), "¥30");
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(fmt(10.0, "XYZ"), "10.00 XYZ");
    }

    #[test]
    fn test_grouping_and_negative() {
        assert_eq!(fmt(1234567.891, "USD"), "$1,234,567.89");
        assert_eq!(fmt(-5.0, "EUR"), "-€5.00");
        assert_eq!(fmt(-0.001, "USD"), "$0.00");
    }

    #[test]
    fn test_code_only() {
        let options = FormatOptions {
            show_symbol: false,
            show_code: true,
            ..Default::default()
        };
        assert_eq!(format(1234.5, "GBP", &options), "1234.50 GBP");
    }

    #[test]
    fn test_symbol_and_code() {
        let options = FormatOptions {
            show_code: true,
            ..Default::default()
        };
        assert_eq!(format(12.0, "EUR", &options), "€12.00 EUR");
    }

    #[test]
    fn test_neither_symbol_nor_code() {
        let options = FormatOptions {
            show_symbol: false,
            ..Default::default()
        };
        assert_eq!(format(12.346, "USD", &options), "12.35");
        assert_eq!(format(12.346, "KRW", &options), "12");
    }

    #[test]
    fn test_fraction_digit_overrides() {
        let options = FormatOptions {
            minimum_fraction_digits: Some(0),
            maximum_fraction_digits: Some(4),
            ..Default::default()
        };
        assert_eq!(format(1.5, "USD", &options), "$1.5");
        assert_eq!(format(1.23456, "USD", &options), "$1.2346");
        assert_eq!(format(3.0, "USD", &options), "$3");

        let more = FormatOptions {
            minimum_fraction_digits: Some(3),
            ..Default::default()
        };
        assert_eq!(format(1.5, "USD", &more), "$1.500");
    }

    #[test]
    fn test_max_below_min_is_clamped() {
        let options = FormatOptions {
            minimum_fraction_digits: Some(3),
            maximum_fraction_digits: Some(1),
            ..Default::default()
        };
        assert_eq!(format(1.0, "USD", &options), "$1.000");
    }

    #[test]
    fn test_only_max_below_default() {
        let options = FormatOptions {
            maximum_fraction_digits: Some(0),
            ..Default::default()
        };
        assert_eq!(format(9.6, "USD", &options), "$10");
    }

    #[test]
    fn test_european_locales() {
        let de = FormatOptions {
            locale: Locale::DeDe,
            ..Default::default()
        };
        assert_eq!(format(1234.5, "EUR", &de), "1.234,50\u{a0}€");

        let fr = FormatOptions {
            locale: Locale::FrFr,
            ..Default::default()
        };
        assert_eq!(format(1234.5, "EUR", &fr), "1\u{202f}234,50\u{a0}€");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("de_DE".parse::<Locale>().unwrap(), Locale::DeDe);
        assert_eq!("EN-us".parse::<Locale>().unwrap(), Locale::EnUs);
        assert!("xx".parse::<Locale>().is_err());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: FormatOptions = serde_json::from_str(r#"{"show_code": true}"#).unwrap();
        assert!(options.show_symbol);
        assert!(options.show_code);
        assert_eq!(options.locale, Locale::EnUs);
    }
}
