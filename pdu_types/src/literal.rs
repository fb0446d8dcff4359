/* Literal values for defaults, initial values and static values */

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/* Literal exactly as it appeared in the schema document */
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum LiteralDef {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/* Parsed literal value */
#[derive(Serialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum Literal {
    Integer(i128),
    Float(f64),
    Bool(bool),
    /* Dotted reference such as `DisPduType.ENTITY_STATE` */
    EnumRef { type_name: String, variant: String },
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("invalid literal '{text}': {reason}")]
pub struct LiteralParseError {
    pub text: String,
    pub reason: &'static str,
}

impl LiteralDef {
    pub fn parse(&self) -> Result<Literal, LiteralParseError> {
        match self {
            LiteralDef::Unsigned(v) => Ok(Literal::Integer(*v as i128)),
            LiteralDef::Signed(v) => Ok(Literal::Integer(*v as i128)),
            LiteralDef::Float(v) => Ok(Literal::Float(*v)),
            LiteralDef::Bool(v) => Ok(Literal::Bool(*v)),
            LiteralDef::Text(text) => Literal::parse_text(text),
        }
    }
}

impl Literal {
    pub fn parse_text(text: &str) -> Result<Literal, LiteralParseError> {
        let trimmed = text.trim();
        let err = |reason| LiteralParseError {
            text: text.to_string(),
            reason,
        };
        if trimmed.is_empty() {
            return Err(err("empty literal"));
        }
        match trimmed {
            "true" => return Ok(Literal::Bool(true)),
            "false" => return Ok(Literal::Bool(false)),
            _ => {}
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits = digits.replace('_', "");
        let radix_value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(i128::from_str_radix(hex, 16).map_err(|_| err("bad hexadecimal digits"))?)
        } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
            Some(i128::from_str_radix(bin, 2).map_err(|_| err("bad binary digits"))?)
        } else {
            None
        };
        if let Some(value) = radix_value {
            return Ok(Literal::Integer(if negative { -value } else { value }));
        }
        if digits.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            if let Ok(value) = digits.parse::<i128>() {
                return Ok(Literal::Integer(if negative { -value } else { value }));
            }
            return trimmed
                .replace('_', "")
                .parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| err("not a number"));
        }

        /* Anything else must be a dotted enum reference */
        match trimmed.rsplit_once('.') {
            Some((type_name, variant))
                if !negative && is_identifier_path(type_name) && is_identifier(variant) =>
            {
                Ok(Literal::EnumRef {
                    type_name: type_name.to_string(),
                    variant: variant.to_string(),
                })
            }
            _ => Err(err("expected a number, a boolean or a Type.VARIANT reference")),
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Literal::Integer(v) => Some(*v),
            Literal::Bool(b) => Some(*b as i128),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::EnumRef { type_name, variant } => write!(f, "{}.{}", type_name, variant),
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_identifier_path(s: &str) -> bool {
    s.split('.').all(is_identifier)
}
