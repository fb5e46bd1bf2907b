//! Currency Symbols with Macro-Based Table Generation
//!
//! This library knows how to display an amount of a given currency: which
//! symbol to use and whether it goes before or after the number. The table
//! is defined declaratively with a macro; codes missing from it fall back
//! to a generic `"{value} {CODE}"` format.
//!
//! # Adding a New Currency
//! Simply add a line to the `define_symbols!` macro invocation:
//! ```ignore
//! define_symbols! {
//!     // ... existing currencies ...
//!     "XOF" => Suffix("CFA"),
//! }
//! ```
//!
//! # Example
//! ```
//! use currency_symbols::icon_for;
//!
//! assert_eq!(icon_for("usd").format(12.5, None), "$12.50");
//! assert_eq!(icon_for("SEK").format(12.5, None), "12.50 kr");
//! assert_eq!(icon_for("XYZ").format(12.5, None), "12.50 XYZ");
//! ```

use std::borrow::Cow;

// ─────────────────────────────────────────────────────────────────────────────
// Number Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Default number of decimals.
pub const DEFAULT_PRECISION: usize = 2;

/// Decimals used when the default rendering of a non-zero value reads as zero.
pub const SMALL_VALUE_PRECISION: usize = 8;

/// Formats `value` with an explicit precision, or with the default policy:
/// two decimals, widened to eight when two decimals would print a non-zero
/// value as zero.
pub fn format_number(value: f64, precision: Option<usize>) -> String {
    if let Some(precision) = precision {
        return format!("{:.*}", precision, value);
    }

    let text = format!("{:.*}", DEFAULT_PRECISION, value);
    if value != 0.0 && reads_as_zero(&text) {
        format!("{:.*}", SMALL_VALUE_PRECISION, value)
    } else {
        text
    }
}

fn reads_as_zero(text: &str) -> bool {
    text.trim_start_matches('-')
        .chars()
        .all(|c| c == '0' || c == '.')
}

// ─────────────────────────────────────────────────────────────────────────────
// Symbols
// ─────────────────────────────────────────────────────────────────────────────

/// Where a symbol sits relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// `$12.50`
    Prefix,
    /// `12.50 kr`
    Suffix,
}

/// One row of the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub code: &'static str,
    pub symbol: &'static str,
    pub placement: Placement,
}

/// Display formatter for one currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyIcon {
    code: String,
    symbol: Cow<'static, str>,
    placement: Placement,
}

impl CurrencyIcon {
    fn known(symbol: &Symbol) -> Self {
        Self {
            code: symbol.code.to_string(),
            symbol: Cow::Borrowed(symbol.symbol),
            placement: symbol.placement,
        }
    }

    /// Generic format for codes without a table entry.
    pub fn generic(code: &str) -> Self {
        let code = code.to_uppercase();
        Self {
            symbol: Cow::Owned(code.clone()),
            code,
            placement: Placement::Suffix,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Formats `value` with this currency's symbol.
    ///
    /// `precision` overrides the default decimal policy of [`format_number`].
    pub fn format(&self, value: f64, precision: Option<usize>) -> String {
        let number = format_number(value, precision);
        match self.placement {
            Placement::Suffix => format!("{} {}", number, self.symbol),
            Placement::Prefix => match number.strip_prefix('-') {
                Some(abs) => format!("-{}{}", self.symbol, abs),
                None => format!("{}{}", self.symbol, number),
            },
        }
    }
}

/// Returns the formatter for `code`, case-insensitively.
pub fn icon_for(code: &str) -> CurrencyIcon {
    lookup(code)
        .map(CurrencyIcon::known)
        .unwrap_or_else(|| CurrencyIcon::generic(code))
}

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the symbol table and its lookups
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define the symbol table with auto-generated lookups.
///
/// # Syntax
/// ```ignore
/// define_symbols! {
///     "CODE" => Prefix("SYMBOL"),
///     "CODE" => Suffix("SYMBOL"),
/// }
/// ```
#[macro_export]
macro_rules! define_symbols {
    (
        $(
            $code:literal => $placement:ident($symbol:literal)
        ),* $(,)?
    ) => {
        static SYMBOLS: &[$crate::Symbol] = &[
            $(
                $crate::Symbol {
                    code: $code,
                    symbol: $symbol,
                    placement: $crate::Placement::$placement,
                }
            ),*
        ];

        /// Every currency with a dedicated symbol.
        pub fn all() -> &'static [$crate::Symbol] {
            SYMBOLS
        }

        /// Table entry for `code`, if any.
        pub fn lookup(code: &str) -> Option<&'static $crate::Symbol> {
            let code = code.trim().to_uppercase();
            SYMBOLS.iter().find(|s| s.code == code)
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// SYMBOL DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_symbols! {
    "ALL" => Suffix("Lek"),
    "AFN" => Suffix("؋"),
    "ARS" => Prefix("$"),
    "AWG" => Suffix("ƒ"),
    "AUD" => Prefix("$"),
    "AZN" => Suffix("₼"),
    "BSD" => Prefix("$"),
    "BBD" => Prefix("$"),
    "BYN" => Suffix("Br"),
    "BZD" => Prefix("BZ$"),
    "BMD" => Prefix("$"),
    "BOB" => Suffix("$b"),
    "BAM" => Suffix("KM"),
    "BWP" => Suffix("P"),
    "BGN" => Suffix("лв"),
    "BRL" => Prefix("R$"),
    "BND" => Prefix("$"),
    "KHR" => Suffix("៛"),
    "CAD" => Prefix("$"),
    "KYD" => Prefix("$"),
    "CLP" => Prefix("$"),
    "CNY" => Prefix("¥"),
    "COP" => Prefix("$"),
    "CRC" => Prefix("₡"),
    "HRK" => Suffix("kn"),
    "CUP" => Prefix("₱"),
    "CZK" => Suffix("Kč"),
    "DKK" => Suffix("kr"),
    "DOP" => Prefix("RD$"),
    "XCD" => Prefix("$"),
    "EGP" => Prefix("£"),
    "SVC" => Prefix("$"),
    "EUR" => Prefix("€"),
    "FKP" => Prefix("£"),
    "FJD" => Prefix("$"),
    "GHS" => Prefix("¢"),
    "GIP" => Prefix("£"),
    "GTQ" => Suffix("Q"),
    "GGP" => Prefix("£"),
    "GYD" => Prefix("$"),
    "HNL" => Suffix("L"),
    "HKD" => Prefix("$"),
    "HUF" => Suffix("Ft"),
    "ISK" => Suffix("kr"),
    "INR" => Prefix("₹"),
    "IDR" => Suffix("Rp"),
    "IRR" => Prefix("﷼"),
    "IMP" => Prefix("£"),
    "ILS" => Prefix("₪"),
    "JMD" => Prefix("J$"),
    "JPY" => Prefix("¥"),
    "JEP" => Prefix("£"),
    "KZT" => Suffix("лв"),
    "KPW" => Prefix("₩"),
    "KRW" => Prefix("₩"),
    "KGS" => Suffix("лв"),
    "LAK" => Prefix("₭"),
    "LBP" => Prefix("£"),
    "LRD" => Prefix("$"),
    "MKD" => Suffix("ден"),
    "MYR" => Suffix("RM"),
    "MUR" => Prefix("₨"),
    "MXN" => Prefix("$"),
    "MNT" => Prefix("₮"),
    "MZN" => Suffix("MT"),
    "NAD" => Prefix("$"),
    "NPR" => Prefix("₨"),
    "ANG" => Suffix("ƒ"),
    "NZD" => Prefix("$"),
    "NIO" => Prefix("C$"),
    "NGN" => Prefix("₦"),
    "NOK" => Suffix("kr"),
    "OMR" => Prefix("﷼"),
    "PKR" => Prefix("₨"),
    "PAB" => Prefix("B/."),
    "PYG" => Suffix("Gs"),
    "PEN" => Prefix("S/."),
    "PHP" => Prefix("₱"),
    "PLN" => Suffix("zł"),
    "QAR" => Prefix("﷼"),
    "RON" => Suffix("lei"),
    "RUB" => Prefix("₽"),
    "SHP" => Prefix("£"),
    "SAR" => Prefix("﷼"),
    "RSD" => Suffix("Дин."),
    "SCR" => Prefix("₨"),
    "SGD" => Prefix("$"),
    "SBD" => Prefix("$"),
    "SOS" => Suffix("S"),
    "ZAR" => Suffix("R"),
    "LKR" => Prefix("₨"),
    "SEK" => Suffix("kr"),
    "CHF" => Suffix("CHF"),
    "SRD" => Prefix("$"),
    "SYP" => Prefix("£"),
    "TWD" => Prefix("NT$"),
    "THB" => Prefix("฿"),
    "TTD" => Prefix("TT$"),
    "TRY" => Prefix("₺"),
    "TVD" => Prefix("$"),
    "UAH" => Prefix("₴"),
    "GBP" => Prefix("£"),
    "USD" => Prefix("$"),
    "UYU" => Suffix("$U"),
    "UZS" => Suffix("лв"),
    "VEF" => Suffix("Bs"),
    "VND" => Prefix("₫"),
    "YER" => Prefix("﷼"),
    "ZWD" => Prefix("Z$"),
    "TND" => Suffix("DT"),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
