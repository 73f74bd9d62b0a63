use std::str::FromStr;

/// Comparison operator of a rule condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Equal,
    NotEqual,
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            ">=" => Ok(Self::GreaterEqual),
            "<=" => Ok(Self::LessEqual),
            "==" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            _ => Err(format!("unknown compare operator: {s}")),
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }

    /// Translation key of the operator's wording in alert sentences.
    pub(crate) fn i18n_key(&self) -> &'static str {
        match self {
            Self::GreaterThan => "op.gt",
            Self::LessThan => "op.lt",
            Self::GreaterEqual => "op.ge",
            Self::LessEqual => "op.le",
            Self::Equal => "op.eq",
            Self::NotEqual => "op.ne",
        }
    }

    #[allow(clippy::float_cmp)]
    pub fn check(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            Self::GreaterEqual => value >= threshold,
            Self::LessEqual => value <= threshold,
            Self::Equal => value == threshold,
            Self::NotEqual => value != threshold,
        }
    }
}

/// Applies `operator` to `value` and `threshold`.
///
/// Unknown operators evaluate to `false` so that one malformed rule cannot
/// abort the evaluation of a host.
///
/// ```
/// use hostscore_alert::condition::evaluate;
///
/// assert!(evaluate(95.0, ">", 80.0));
/// assert!(!evaluate(95.0, "<=", 80.0));
/// assert!(!evaluate(95.0, "=~", 80.0));
/// ```
pub fn evaluate(value: f64, operator: &str, threshold: f64) -> bool {
    match operator.parse::<CompareOp>() {
        Ok(op) => op.check(value, threshold),
        Err(e) => {
            tracing::warn!(operator, error = %e, "Condition skipped");
            false
        }
    }
}
