use std::num::ParseFloatError;

/// A raw field value that cannot become a metric value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid metric value {raw:?}: {source}")]
    Invalid {
        raw: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("metric value {raw:?} is out of range")]
    OutOfRange { raw: String },
}

impl ParseError {
    /// The rejected value, verbatim.
    pub fn raw(&self) -> &str {
        match self {
            ParseError::Invalid { raw, .. } | ParseError::OutOfRange { raw } => raw,
        }
    }
}

/// Parses a raw device field into a metric value.
///
/// Pure: the caller decides how a failure is reported. Finite literals too
/// large for an `f64` are rejected rather than rounded to infinity; the
/// spelled-out `inf` and `nan` forms are still accepted.
///
/// # Examples
///
/// ```
/// use rosmon_collector::coercion::parse_value;
///
/// assert_eq!(parse_value("1024").unwrap(), 1024.0);
/// assert_eq!(parse_value("0.5").unwrap(), 0.5);
/// let err = parse_value("abc").unwrap_err();
/// assert_eq!(err.raw(), "abc");
/// assert!(parse_value("1e400").is_err());
/// ```
pub fn parse_value(raw: &str) -> Result<f64, ParseError> {
    let value = raw.parse::<f64>().map_err(|source| ParseError::Invalid {
        raw: raw.to_string(),
        source,
    })?;
    if !value.is_finite() && !is_special_literal(raw) {
        return Err(ParseError::OutOfRange {
            raw: raw.to_string(),
        });
    }
    Ok(value)
}

fn is_special_literal(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['+', '-']);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|word| unsigned.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_keeps_large_byte_counters() {
        assert_eq!(parse_value("18446744073709551615").unwrap(), u64::MAX as f64);
        assert_eq!(parse_value("0").unwrap(), 0.0);
    }

    #[test]
    fn parse_value_accepts_exponent_and_sign() {
        assert_eq!(parse_value("1e3").unwrap(), 1000.0);
        assert_eq!(parse_value("+12").unwrap(), 12.0);
        assert_eq!(parse_value("-3.5").unwrap(), -3.5);
    }

    #[test]
    fn parse_value_rejects_uptime_and_padded_values() {
        for raw in ["1h2m3s", " 12", "12 ", "1,024", "0x10", ""] {
            let err = parse_value(raw).unwrap_err();
            assert_eq!(err.raw(), raw);
            assert!(matches!(err, ParseError::Invalid { .. }));
        }
    }

    #[test]
    fn parse_value_rejects_overflowing_literals() {
        for raw in ["1e400", "-1e400", "9".repeat(400).as_str()] {
            let err = parse_value(raw).unwrap_err();
            assert_eq!(err, ParseError::OutOfRange { raw: raw.to_string() });
        }
    }

    #[test]
    fn parse_value_accepts_spelled_out_special_values() {
        assert_eq!(parse_value("inf").unwrap(), f64::INFINITY);
        assert_eq!(parse_value("-Infinity").unwrap(), f64::NEG_INFINITY);
        assert!(parse_value("NaN").unwrap().is_nan());
    }

    #[test]
    fn parse_value_underflow_reads_as_zero() {
        assert_eq!(parse_value("1e-400").unwrap(), 0.0);
    }

    #[test]
    fn parse_error_message_names_raw_value() {
        let err = parse_value("abc").unwrap_err();
        assert!(err.to_string().contains("\"abc\""));
        assert!(std::error::Error::source(&err).is_some());
    }
}
