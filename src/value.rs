//! Declaration splitting, length parsing and margin shorthand handling.

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use smallvec::SmallVec;

const IMPORTANT: &str = "!important";

/// Length unit recognized on numeric values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    /// Unitless number.
    #[default]
    None,
    /// `em`
    Em,
    /// `rem`
    Rem,
    /// `px`
    Px,
    /// `pt`
    Pt,
    /// `%`
    Percent,
    /// `vh`
    Vh,
    /// `vw`
    Vw,
    /// `ch`
    Ch,
    /// `ex`
    Ex,
}

impl LengthUnit {
    // `rem` must be tried before `em`.
    const SUFFIXES: [(&'static str, LengthUnit); 9] = [
        ("rem", LengthUnit::Rem),
        ("em", LengthUnit::Em),
        ("px", LengthUnit::Px),
        ("pt", LengthUnit::Pt),
        ("%", LengthUnit::Percent),
        ("vh", LengthUnit::Vh),
        ("vw", LengthUnit::Vw),
        ("ch", LengthUnit::Ch),
        ("ex", LengthUnit::Ex),
    ];

    /// CSS spelling of the unit (empty for unitless numbers).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Px => "px",
            Self::Pt => "pt",
            Self::Percent => "%",
            Self::Vh => "vh",
            Self::Vw => "vw",
            Self::Ch => "ch",
            Self::Ex => "ex",
        }
    }
}

/// Numeric CSS value with its unit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CssLength {
    /// Numeric part.
    pub magnitude: f64,
    /// Unit suffix.
    pub unit: LengthUnit,
}

impl CssLength {
    /// Parse `<number><unit>`; anything unparsable collapses to unitless zero.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        let (number, unit) = LengthUnit::SUFFIXES
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix))
            .map(|(suffix, unit)| (&raw[..raw.len() - suffix.len()], *unit))
            .unwrap_or((raw, LengthUnit::None));
        match number.trim().parse::<f64>() {
            Ok(magnitude) if magnitude.is_finite() => Self { magnitude, unit },
            _ => Self::default(),
        }
    }

    /// Same length with a negative (or NaN) magnitude replaced by zero.
    pub fn clamp_non_negative(self) -> Self {
        let magnitude = if self.magnitude > 0.0 {
            self.magnitude
        } else {
            0.0
        };
        Self { magnitude, ..self }
    }
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.as_str())
    }
}

/// Strip a trailing `!important` from a value.
///
/// Returns the remaining value (trimmed) and whether the flag was present.
pub fn strip_important(value: &str) -> (&str, bool) {
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() >= IMPORTANT.len()
        && bytes[bytes.len() - IMPORTANT.len()..].eq_ignore_ascii_case(IMPORTANT.as_bytes())
    {
        (value[..value.len() - IMPORTANT.len()].trim_end(), true)
    } else {
        (value, false)
    }
}

/// A raw declaration split at its first `:`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Declaration<'a> {
    /// Property name as written, trimmed.
    pub property: &'a str,
    /// Value as written, trimmed, trailing `;` removed, `!important` kept.
    pub value: &'a str,
}

impl<'a> Declaration<'a> {
    /// Split `property: value`; `None` when there is no `:`.
    pub fn split(raw: &'a str) -> Option<Self> {
        let (property, value) = raw.split_once(':')?;
        let value = value.trim();
        let value = value.strip_suffix(';').map(str::trim_end).unwrap_or(value);
        Some(Self {
            property: property.trim(),
            value,
        })
    }

    /// Lower-cased property name for matching.
    pub fn property_lower(&self) -> String {
        self.property.to_ascii_lowercase()
    }

    /// Value with any `!important` removed, plus the flag.
    pub fn value_and_importance(&self) -> (&'a str, bool) {
        strip_important(self.value)
    }
}

impl fmt::Display for Declaration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)
    }
}

/// Render `property: value` with an optional `!important` suffix.
pub fn format_declaration(property: &str, value: &str, important: bool) -> String {
    if important {
        format!("{}: {} {}", property, value, IMPORTANT)
    } else {
        format!("{}: {}", property, value)
    }
}

/// Four sides of a `margin`/`padding` shorthand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarginSides {
    /// `top` component.
    pub top: String,
    /// `right` component.
    pub right: String,
    /// `bottom` component.
    pub bottom: String,
    /// `left` component.
    pub left: String,
}

impl MarginSides {
    /// Expand a 1-4 component shorthand value (without `!important`).
    ///
    /// Empty values and values with more than four components expand to
    /// four `0` sides.
    pub fn expand(value: &str) -> Self {
        let parts: SmallVec<[&str; 4]> = value.split_whitespace().collect();
        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => ("0", "0", "0", "0"),
        };
        Self {
            top: top.to_string(),
            right: right.to_string(),
            bottom: bottom.to_string(),
            left: left.to_string(),
        }
    }

    /// Recompose as an explicit four-value shorthand.
    pub fn to_shorthand(&self) -> String {
        format!("{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}
