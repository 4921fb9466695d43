//! Currency Catalog, Rate Snapshots and Conversion Arithmetic
//!
//! This library holds the pieces of currency handling that need no I/O:
//! the static catalog of supported currencies, the built-in fallback rate
//! table, the country to currency lookup, the `RateSnapshot` value, and the
//! pure `convert` / `format` functions that consume it.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` macro invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     "THB" => ("Thai Baht", "฿", "🇹🇭", 2, 35.9),
//! }
//! ```
//!
//! # Example
//! ```
//! use exchange_rates::{FormatOptions, RateSnapshot, convert, format};
//!
//! let snapshot = RateSnapshot::fallback("USD");
//! let euros = convert(100.0, "USD", "EUR", &snapshot);
//! println!("{}", format(euros, "EUR", &FormatOptions::default()));
//! ```

mod convert;
mod format;
mod snapshot;

pub use convert::{convert, rate_between};
pub use format::{FormatOptions, Locale, format};
pub use snapshot::{RateSnapshot, SnapshotError};

use serde::Serialize;

/// Default base currency for every snapshot.
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

// ─────────────────────────────────────────────────────────────────────────────
// Currency Descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Static description of a supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Currency {
    /// ISO 4217 code, e.g. `"USD"`.
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub flag: &'static str,
    /// Fraction digits shown when formatting.
    pub decimal_places: u8,
}

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the catalog and the fallback rate table side by side
// ─────────────────────────────────────────────────────────────────────────────

/// Defines the currency catalog and the fallback rates in one place.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     "CODE" => ("Display name", "symbol", "flag", decimal_places, units_per_usd),
/// }
/// ```
macro_rules! define_currencies {
    (
        $(
            $code:literal => ($name:literal, $symbol:literal, $flag:literal, $decimals:expr, $per_usd:expr)
        ),* $(,)?
    ) => {
        static CURRENCIES: &[Currency] = &[
            $(
                Currency {
                    code: $code,
                    name: $name,
                    symbol: $symbol,
                    flag: $flag,
                    decimal_places: $decimals,
                }
            ),*
        ];

        /// Hard-coded units of each currency per one US dollar. Plausible, not live.
        static FALLBACK_RATES: &[(&str, f64)] = &[$(($code, $per_usd)),*];
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    "USD" => ("US Dollar", "$", "🇺🇸", 2, 1.0),
    "EUR" => ("Euro", "€", "🇪🇺", 2, 0.92),
    "GBP" => ("British Pound", "£", "🇬🇧", 2, 0.79),
    "JPY" => ("Japanese Yen", "¥", "🇯🇵", 0, 149.5),
    "CAD" => ("Canadian Dollar", "C$", "🇨🇦", 2, 1.36),
    "AUD" => ("Australian Dollar", "A$", "🇦🇺", 2, 1.52),
    "CHF" => ("Swiss Franc", "CHF", "🇨🇭", 2, 0.88),
    "CNY" => ("Chinese Yuan", "CN¥", "🇨🇳", 2, 7.24),
    "INR" => ("Indian Rupee", "₹", "🇮🇳", 2, 83.12),
    "KRW" => ("South Korean Won", "₩", "🇰🇷", 0, 1320.0),
    "BRL" => ("Brazilian Real", "R$", "🇧🇷", 2, 4.97),
    "MXN" => ("Mexican Peso", "MX$", "🇲🇽", 2, 17.15),
    "SGD" => ("Singapore Dollar", "S$", "🇸🇬", 2, 1.34),
    "HKD" => ("Hong Kong Dollar", "HK$", "🇭🇰", 2, 7.82),
    "NOK" => ("Norwegian Krone", "kr", "🇳🇴", 2, 10.55),
    "SEK" => ("Swedish Krona", "kr", "🇸🇪", 2, 10.42),
    "DKK" => ("Danish Krone", "kr", "🇩🇰", 2, 6.87),
    "PLN" => ("Polish Złoty", "zł", "🇵🇱", 2, 4.02),
    "ZAR" => ("South African Rand", "R", "🇿🇦", 2, 18.65),
    "NZD" => ("New Zealand Dollar", "NZ$", "🇳🇿", 2, 1.64),
}

/// ISO 3166-1 alpha-2 country code to the currency used there.
static COUNTRY_CURRENCIES: &[(&str, &str)] = &[
    ("US", "USD"),
    ("GB", "GBP"),
    ("DE", "EUR"),
    ("FR", "EUR"),
    ("IT", "EUR"),
    ("ES", "EUR"),
    ("NL", "EUR"),
    ("BE", "EUR"),
    ("AT", "EUR"),
    ("PT", "EUR"),
    ("IE", "EUR"),
    ("FI", "EUR"),
    ("GR", "EUR"),
    ("JP", "JPY"),
    ("CA", "CAD"),
    ("AU", "AUD"),
    ("CH", "CHF"),
    ("CN", "CNY"),
    ("IN", "INR"),
    ("KR", "KRW"),
    ("BR", "BRL"),
    ("MX", "MXN"),
    ("SG", "SGD"),
    ("HK", "HKD"),
    ("NO", "NOK"),
    ("SE", "SEK"),
    ("DK", "DKK"),
    ("PL", "PLN"),
    ("ZA", "ZAR"),
    ("NZ", "NZD"),
];

// ─────────────────────────────────────────────────────────────────────────────
// Catalog Lookups
// ─────────────────────────────────────────────────────────────────────────────

/// All supported currencies, in catalog order.
pub fn supported_currencies() -> &'static [Currency] {
    CURRENCIES
}

/// Finds a currency by code, ignoring ASCII case.
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Built-in rate for a currency, in units per US dollar.
pub fn fallback_rate(code: &str) -> Option<f64> {
    FALLBACK_RATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, rate)| *rate)
}

pub(crate) fn fallback_rates() -> impl Iterator<Item = (String, f64)> {
    FALLBACK_RATES
        .iter()
        .map(|(code, rate)| (code.to_string(), *rate))
}

/// Maps a country code to its currency, if the country is known.
pub fn currency_for_country(country_code: &str) -> Option<&'static str> {
    COUNTRY_CURRENCIES
        .iter()
        .find(|(country, _)| country.eq_ignore_ascii_case(country_code.trim()))
        .map(|(_, currency)| *currency)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
