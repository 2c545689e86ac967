//! Arbitrary-value data types and inference.
//!
//! Functional utilities declare which data types they accept. An arbitrary
//! value can carry an explicit tag (`[length:10px]`); untagged values are
//! classified here against the utility's accepted set.

use std::sync::LazyLock;

use regex::Regex;

/// Data types an arbitrary value can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Any,
    Color,
    Length,
    Percentage,
    Number,
    Integer,
    Url,
    Position,
    Image,
    LineWidth,
    Angle,
    FamilyName,
}

impl DataType {
    /// Parse an explicit type tag (`length`, `color`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "any" => Self::Any,
            "color" => Self::Color,
            "length" => Self::Length,
            "percentage" => Self::Percentage,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "url" => Self::Url,
            "position" => Self::Position,
            "image" => Self::Image,
            "line-width" => Self::LineWidth,
            "angle" => Self::Angle,
            "family-name" => Self::FamilyName,
            _ => return None,
        })
    }

    /// The canonical tag name.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Color => "color",
            Self::Length => "length",
            Self::Percentage => "percentage",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Url => "url",
            Self::Position => "position",
            Self::Image => "image",
            Self::LineWidth => "line-width",
            Self::Angle => "angle",
            Self::FamilyName => "family-name",
        }
    }
}

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+|\d*\.\d+)$").expect("valid regex"));
static LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[+-]?(\d+|\d*\.\d+)(px|em|rem|ex|ch|cm|mm|in|pt|pc|q|vw|vh|vmin|vmax|svw|svh|lvw|lvh|dvw|dvh|cqw|cqh|cqi|cqb|cqmin|cqmax)$",
    )
    .expect("valid regex")
});
static PERCENTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+|\d*\.\d+)%$").expect("valid regex"));
static ANGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+|\d*\.\d+)(deg|grad|rad|turn)$").expect("valid regex"));
static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("valid regex")
});

const COLOR_FUNCTIONS: &[&str] = &[
    "rgb(", "rgba(", "hsl(", "hsla(", "hwb(", "lab(", "lch(", "oklab(", "oklch(", "color(",
    "color-mix(", "light-dark(",
];

const COLOR_KEYWORDS: &[&str] = &[
    "black", "white", "red", "green", "blue", "yellow", "orange", "purple", "pink", "gray",
    "grey", "silver", "maroon", "navy", "teal", "aqua", "fuchsia", "lime", "olive",
    "currentcolor", "transparent", "inherit",
];

const MATH_FUNCTIONS: &[&str] = &["calc(", "min(", "max(", "clamp("];

const POSITION_KEYWORDS: &[&str] = &["top", "bottom", "left", "right", "center"];

const IMAGE_FUNCTIONS: &[&str] = &[
    "linear-gradient(",
    "radial-gradient(",
    "conic-gradient(",
    "repeating-linear-gradient(",
    "repeating-radial-gradient(",
    "repeating-conic-gradient(",
    "image-set(",
    "cross-fade(",
];

fn is_math_function(value: &str) -> bool {
    MATH_FUNCTIONS.iter().any(|f| value.starts_with(f))
}

fn is_var_reference(value: &str) -> bool {
    value.starts_with("var(")
}

fn matches_type(value: &str, ty: DataType) -> bool {
    match ty {
        DataType::Any => true,
        DataType::Number => NUMBER.is_match(value) || is_math_function(value),
        DataType::Integer => value.parse::<i64>().is_ok() || is_math_function(value),
        DataType::Length => {
            value == "0" || LENGTH.is_match(value) || is_math_function(value) || is_var_reference(value)
        }
        DataType::Percentage => PERCENTAGE.is_match(value) || is_math_function(value),
        DataType::Angle => ANGLE.is_match(value),
        DataType::Color => {
            HEX_COLOR.is_match(value)
                || COLOR_FUNCTIONS.iter().any(|f| value.starts_with(f))
                || COLOR_KEYWORDS.contains(&value.to_ascii_lowercase().as_str())
        }
        DataType::Url => value.starts_with("url("),
        DataType::LineWidth => {
            matches!(value, "thin" | "medium" | "thick") || matches_type(value, DataType::Length)
        }
        DataType::Position => value
            .split_whitespace()
            .all(|word| POSITION_KEYWORDS.contains(&word) || matches_type(word, DataType::Length) || matches_type(word, DataType::Percentage)),
        DataType::Image => {
            value.starts_with("url(") || IMAGE_FUNCTIONS.iter().any(|f| value.starts_with(f))
        }
        DataType::FamilyName => {
            !value.is_empty() && !NUMBER.is_match(value) && !value.contains(['(', ')'])
        }
    }
}

/// Infer the data type of an untagged arbitrary value against an accepted
/// set. The first accepted type the value matches wins; `None` means the
/// value fits none of them.
pub fn infer_data_type(value: &str, types: &[DataType]) -> Option<DataType> {
    if value.is_empty() {
        return None;
    }

    types.iter().copied().find(|ty| matches_type(value, *ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for tag in ["color", "length", "percentage", "number", "line-width"] {
            assert_eq!(DataType::from_tag(tag).unwrap().tag(), tag);
        }
        assert_eq!(DataType::from_tag("nonsense"), None);
    }

    #[test]
    fn infers_lengths() {
        assert_eq!(infer_data_type("10px", &[DataType::Length]), Some(DataType::Length));
        assert_eq!(infer_data_type("1.5rem", &[DataType::Length]), Some(DataType::Length));
        assert_eq!(infer_data_type("0", &[DataType::Length]), Some(DataType::Length));
        assert_eq!(
            infer_data_type("calc(100% - 2rem)", &[DataType::Length]),
            Some(DataType::Length)
        );
        assert_eq!(infer_data_type("red", &[DataType::Length]), None);
    }

    #[test]
    fn infers_colors() {
        for value in ["#fff", "#ef4444", "rgb(1 2 3)", "oklch(0.7 0.1 200)", "red", "currentColor"] {
            assert_eq!(infer_data_type(value, &[DataType::Color]), Some(DataType::Color));
        }
        assert_eq!(infer_data_type("33px", &[DataType::Color]), None);
    }

    #[test]
    fn accepted_set_order_decides() {
        // `0` is both a number and a length; the accepted set's order wins.
        assert_eq!(
            infer_data_type("0", &[DataType::Number, DataType::Length]),
            Some(DataType::Number)
        );
        assert_eq!(
            infer_data_type("10px", &[DataType::Number, DataType::Length]),
            Some(DataType::Length)
        );
    }

    #[test]
    fn numbers_and_percentages() {
        assert_eq!(infer_data_type("42", &[DataType::Number]), Some(DataType::Number));
        assert_eq!(infer_data_type("-0.5", &[DataType::Number]), Some(DataType::Number));
        assert_eq!(
            infer_data_type("33%", &[DataType::Number, DataType::Percentage]),
            Some(DataType::Percentage)
        );
        assert_eq!(infer_data_type("33%", &[DataType::Number]), None);
    }

    #[test]
    fn empty_value_never_matches() {
        assert_eq!(infer_data_type("", &[DataType::Any]), None);
    }
}
