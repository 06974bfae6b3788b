//! Constructor signature extraction
//!
//! Parses a declared parameter list such as
//! `radius = 1, widthSegments = 32, openEnded = false` into named parameters
//! with literal numeric defaults. Anything that is not a plain literal makes
//! the whole signature unusable for numeric live-code arguments.

use thiserror::Error;

/// One formal constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Declared name
    pub name: String,
    /// Literal default, if any
    pub default: Option<f64>,
}

/// Why a signature could not be extracted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The engine does not expose the constructor's source
    #[error("constructor is opaque")]
    Opaque,

    /// Brackets in the parameter list do not balance
    #[error("unbalanced brackets in parameter list")]
    Unbalanced,

    /// A destructuring pattern such as `{ a, b }`
    #[error("parameter {0} is destructured")]
    Destructured(String),

    /// A rest parameter such as `...items`
    #[error("parameter {0} is a rest parameter")]
    Rest(String),

    /// A parameter name that is not an identifier
    #[error("invalid parameter name {0:?}")]
    InvalidName(String),

    /// A default that is not a numeric, hex or boolean literal
    #[error("default for {param} is not a literal: {expression}")]
    NonLiteralDefault {
        /// Parameter name
        param: String,
        /// Default expression as written
        expression: String,
    },
}

/// Parse a parameter list (without the surrounding parentheses)
pub fn parse(source: &str) -> Result<Vec<Param>, SignatureError> {
    split_top_level(source)?
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_param)
        .collect()
}

fn split_top_level(source: &str) -> Result<Vec<&str>, SignatureError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in source.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.checked_sub(1).ok_or(SignatureError::Unbalanced)?,
            ',' if depth == 0 => {
                parts.push(&source[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(SignatureError::Unbalanced);
    }
    parts.push(&source[start..]);
    Ok(parts)
}

fn parse_param(part: &str) -> Result<Param, SignatureError> {
    if part.starts_with('{') || part.starts_with('[') {
        return Err(SignatureError::Destructured(part.to_string()));
    }
    if let Some(rest) = part.strip_prefix("...") {
        return Err(SignatureError::Rest(rest.trim().to_string()));
    }

    let (name, default) = match part.split_once('=') {
        Some((name, expression)) => (name.trim(), Some(expression.trim())),
        None => (part, None),
    };
    if !is_identifier(name) {
        return Err(SignatureError::InvalidName(name.to_string()));
    }

    let default = match default {
        None | Some("undefined") => None,
        Some(expression) => Some(parse_literal(expression).ok_or_else(|| SignatureError::NonLiteralDefault {
            param: name.to_string(),
            expression: expression.to_string(),
        })?),
    };

    Ok(Param {
        name: name.to_string(),
        default,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn parse_literal(expression: &str) -> Option<f64> {
    match expression {
        "true" => return Some(1.0),
        "false" => return Some(0.0),
        _ => {}
    }

    let (negative, magnitude) = match expression.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, expression),
    };

    let value = if let Some(hex) = magnitude.strip_prefix("0x").or_else(|| magnitude.strip_prefix("0X")) {
        // Hex literals are integers; u32 covers every packed color.
        f64::from(u32::from_str_radix(hex, 16).ok()?)
    } else {
        let numeric = magnitude
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-' | '_'));
        if !numeric || magnitude.is_empty() {
            return None;
        }
        magnitude.replace('_', "").parse::<f64>().ok()?
    };

    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, default: Option<f64>) -> Param {
        Param {
            name: name.to_string(),
            default,
        }
    }

    #[test]
    fn test_numeric_defaults() {
        let params = parse("radius = 1, tube = 0.4, arc = 6.283185307179586").expect("literal signature");
        assert_eq!(
            params,
            vec![param("radius", Some(1.0)), param("tube", Some(0.4)), param("arc", Some(6.283185307179586))]
        );
    }

    #[test]
    fn test_hex_boolean_and_missing_defaults() {
        let params = parse("color = 0xffffff, castShadow = true, openEnded = false, target").expect("mixed signature");
        assert_eq!(
            params,
            vec![
                param("color", Some(16_777_215.0)),
                param("castShadow", Some(1.0)),
                param("openEnded", Some(0.0)),
                param("target", None),
            ]
        );
    }

    #[test]
    fn test_negative_and_undefined() {
        let params = parse("offset = -0.5, extra = undefined").expect("signature");
        assert_eq!(params, vec![param("offset", Some(-0.5)), param("extra", None)]);
    }

    #[test]
    fn test_empty_signature() {
        assert_eq!(parse("").expect("empty signature"), Vec::new());
        assert_eq!(parse("  ").expect("blank signature"), Vec::new());
    }

    #[test]
    fn test_non_literal_default_fails() {
        let result = parse("shapes = new Shape( [ new Vector2( 0, 0.5 ) ] ), curveSegments = 12");
        assert!(matches!(
            result,
            Err(SignatureError::NonLiteralDefault { ref param, .. }) if param == "shapes"
        ));
    }

    #[test]
    fn test_rejects_infinity_spelled_out() {
        assert!(matches!(parse("limit = inf"), Err(SignatureError::NonLiteralDefault { .. })));
        assert!(matches!(parse("limit = Infinity"), Err(SignatureError::NonLiteralDefault { .. })));
    }

    #[test]
    fn test_destructured_and_rest() {
        assert!(matches!(parse("{ width, height } = {}"), Err(SignatureError::Destructured(_))));
        assert!(matches!(parse("first, ...others"), Err(SignatureError::Rest(ref name)) if name == "others"));
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(parse("a = f(1, b = 2"), Err(SignatureError::Unbalanced));
        assert_eq!(parse("a = 1)"), Err(SignatureError::Unbalanced));
    }

    #[test]
    fn test_invalid_name() {
        assert!(matches!(parse("1abc = 2"), Err(SignatureError::InvalidName(_))));
    }
}
