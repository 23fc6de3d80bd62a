//! Line parsing and quarter-point quantization.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};
use strum::{Display, EnumString};

/// How a line is rendered and flipped, decided by the canonical market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LineKind {
    /// Unsigned magnitude (totals): "9.5", never "+9.5"; unchanged on the opposite side.
    Total,
    /// Signed spread (handicaps): "+1.25" / "-1.25" / "0"; negated on the opposite side.
    Signed,
}

/// Canonical form of a line value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalLine {
    /// No line quoted (moneyline-style markets).
    Absent,
    /// Parsed and quantized to the nearest quarter point.
    Quantized {
        /// Quantized value, normalized scale.
        value: Decimal,
        /// Rendering/flip rule.
        kind: LineKind,
    },
    /// Could not be parsed; kept verbatim so it can only match itself.
    Unparsed(String),
}

impl CanonicalLine {
    /// Line of the logically opposite outcome.
    ///
    /// Signed lines are negated, totals are unchanged. An unparsed line has its
    /// leading sign flipped textually.
    pub fn opposite(&self) -> CanonicalLine {
        match self {
            CanonicalLine::Absent => CanonicalLine::Absent,
            CanonicalLine::Quantized { value, kind: LineKind::Total } => CanonicalLine::Quantized {
                value: *value,
                kind: LineKind::Total,
            },
            CanonicalLine::Quantized { value, kind: LineKind::Signed } => CanonicalLine::Quantized {
                value: canonical_zero(-*value),
                kind: LineKind::Signed,
            },
            CanonicalLine::Unparsed(raw) => {
                if let Some(rest) = raw.strip_prefix('+') {
                    CanonicalLine::Unparsed(format!("-{rest}"))
                } else if let Some(rest) = raw.strip_prefix('-') {
                    CanonicalLine::Unparsed(format!("+{rest}"))
                } else {
                    CanonicalLine::Unparsed(raw.clone())
                }
            }
        }
    }

    /// Quantized value, if any.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            CanonicalLine::Quantized { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// True when the raw text could not be parsed.
    pub fn is_unparsed(&self) -> bool {
        matches!(self, CanonicalLine::Unparsed(_))
    }
}

impl fmt::Display for CanonicalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalLine::Absent => Ok(()),
            CanonicalLine::Quantized { value, kind } => {
                if value.is_zero() {
                    write!(f, "0")
                } else if *kind == LineKind::Signed && value.is_sign_positive() {
                    write!(f, "+{}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            CanonicalLine::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}

impl Serialize for CanonicalLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse and quantize a raw line.
///
/// Rules, in order:
/// 1. strip whitespace and collapse a run of leading `+` to one;
/// 2. empty or absent → [`CanonicalLine::Absent`];
/// 3. two comma-separated parts are a quarter line → their average; three parts
///    are a quarter line with one decimal-comma half ("0,0,5" = 0 and 0,5);
/// 4. otherwise a single number;
/// 5. round to the nearest 0.25 (midpoints away from zero);
/// 6. anything unparseable is returned verbatim as [`CanonicalLine::Unparsed`].
pub fn canonicalize_line(raw: Option<&str>, kind: LineKind) -> CanonicalLine {
    let Some(raw) = raw else {
        return CanonicalLine::Absent;
    };

    let compact = collapse_plus(&raw.chars().filter(|c| !c.is_whitespace()).collect::<String>());
    if compact.is_empty() {
        return CanonicalLine::Absent;
    }

    let parsed = if compact.contains(',') {
        parse_split_line(&compact)
    } else {
        parse_number(&compact)
    };

    match parsed.and_then(quantize) {
        Some(value) => CanonicalLine::Quantized { value, kind },
        None => CanonicalLine::Unparsed(compact),
    }
}

/// Round to the nearest quarter point, preserving sign.
///
/// Returns `None` when the value is too large to scale.
pub fn quantize(value: Decimal) -> Option<Decimal> {
    let quarters = value
        .checked_mul(dec!(4))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    Some(canonical_zero(quarters.checked_div(dec!(4))?.normalize()))
}

fn canonical_zero(value: Decimal) -> Decimal {
    if value.is_zero() {
        Decimal::ZERO
    } else {
        value.normalize()
    }
}

fn collapse_plus(text: &str) -> String {
    let rest = text.trim_start_matches('+');
    if rest.len() < text.len() {
        format!("+{rest}")
    } else {
        text.to_string()
    }
}

fn parse_number(text: &str) -> Option<Decimal> {
    let unsigned = text.strip_prefix('+').unwrap_or(text);
    if unsigned.starts_with('+') || unsigned.is_empty() {
        return None;
    }
    Decimal::from_str(unsigned).ok()
}

fn parse_split_line(text: &str) -> Option<Decimal> {
    let parts: Vec<&str> = text.split(',').collect();
    match parts.as_slice() {
        [a, b] => parse_number(a)?.checked_add(parse_number(b)?)?.checked_div(dec!(2)),
        [a, b, c] => {
            // One half carries a decimal comma; the halves of a quarter line sit 0.5 apart.
            let tail_comma = parse_number(a).zip(parse_number(&format!("{b}.{c}")));
            let head_comma = parse_number(&format!("{a}.{b}")).zip(parse_number(c));
            let is_quarter =
                |(x, y): &(Decimal, Decimal)| x.checked_sub(*y).map(|d| d.abs()) == Some(dec!(0.5));
            match (tail_comma.filter(is_quarter), head_comma.filter(is_quarter)) {
                (Some((x, y)), None) | (None, Some((x, y))) => x.checked_add(y)?.checked_div(dec!(2)),
                _ => None,
            }
        }
        _ => None,
    }
}
