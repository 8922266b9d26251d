use serde::{Deserialize, Serialize};
use std::fmt;

/// The value every node evaluator produces and consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NumberOrFail {
    Number(f64),
    /// An unmet pass requirement somewhere upstream.
    Fail,
}

impl NumberOrFail {
    pub fn is_fail(&self) -> bool {
        matches!(self, NumberOrFail::Fail)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            NumberOrFail::Number(n) => Some(*n),
            NumberOrFail::Fail => None,
        }
    }
}

impl From<f64> for NumberOrFail {
    fn from(value: f64) -> Self {
        NumberOrFail::Number(value)
    }
}

impl fmt::Display for NumberOrFail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberOrFail::Number(n) => write!(f, "{}", format_number(*n)),
            NumberOrFail::Fail => write!(f, "fail"),
        }
    }
}

/// A node's outcome during preview evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PartialValue {
    Number(f64),
    Fail,
    /// Depends on a source whose value has not been supplied yet.
    Unevaluable,
}

impl PartialValue {
    pub fn known(self) -> Option<NumberOrFail> {
        match self {
            PartialValue::Number(n) => Some(NumberOrFail::Number(n)),
            PartialValue::Fail => Some(NumberOrFail::Fail),
            PartialValue::Unevaluable => None,
        }
    }

    pub fn is_unevaluable(&self) -> bool {
        matches!(self, PartialValue::Unevaluable)
    }
}

impl From<NumberOrFail> for PartialValue {
    fn from(value: NumberOrFail) -> Self {
        match value {
            NumberOrFail::Number(n) => PartialValue::Number(n),
            NumberOrFail::Fail => PartialValue::Fail,
        }
    }
}

impl fmt::Display for PartialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialValue::Number(n) => write!(f, "{}", format_number(*n)),
            PartialValue::Fail => write!(f, "fail"),
            PartialValue::Unevaluable => write!(f, "-"),
        }
    }
}

/// Whole numbers print without a fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
