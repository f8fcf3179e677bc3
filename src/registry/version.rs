//! Version number normalization.
//!
//! Callers may spell a version as "v0002", "2" or "V2"; the registry keys
//! methods by the canonical decimal rendering ("2").

use thiserror::Error;

/// Raised for a version string that holds no usable integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version number: {0:?}")]
pub struct VersionError(pub String);

/// Normalize a caller-supplied version to its canonical decimal form.
///
/// Everything except ASCII digits and `-` is dropped. A leading `-` marks a
/// negative number and the first run of digits is the value; anything after
/// it is ignored. The digits are never parsed into a fixed-width integer, so
/// long numerals normalize instead of overflowing.
pub fn normalize_version(raw: &str) -> Result<String, VersionError> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    let unsigned = kept.trim_start_matches('-');
    let negative = unsigned.len() < kept.len();
    let digits: &str = unsigned
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();
    if digits.is_empty() {
        return Err(VersionError(raw.to_string()));
    }

    let magnitude = digits.trim_start_matches('0');
    Ok(match (magnitude.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{magnitude}"),
        (false, false) => magnitude.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_spellings() {
        assert_eq!(normalize_version("v00001").unwrap(), "1");
        assert_eq!(normalize_version("2").unwrap(), "2");
        assert_eq!(normalize_version("v007").unwrap(), "7");
        assert_eq!(normalize_version("V0002").unwrap(), "2");
        assert_eq!(normalize_version("v0").unwrap(), "0");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["v00001", "2", "v007", "0010", "v-3", "v2-beta", "-0", "99999999999999999999"] {
            let once = normalize_version(raw).unwrap();
            assert_eq!(normalize_version(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_rejects_inputs_without_digits() {
        assert!(normalize_version("").is_err());
        assert!(normalize_version("v").is_err());
        assert!(normalize_version("latest").is_err());
        assert!(normalize_version("-").is_err());
    }

    #[test]
    fn test_trailing_text_after_number_is_ignored() {
        assert_eq!(normalize_version("1-2").unwrap(), "1");
        assert_eq!(normalize_version("v2-beta").unwrap(), "2");
        assert_eq!(normalize_version("3-").unwrap(), "3");
    }

    #[test]
    fn test_sign_and_zero() {
        assert_eq!(normalize_version("v-3").unwrap(), "-3");
        assert_eq!(normalize_version("-0").unwrap(), "0");
        assert_eq!(normalize_version("v000").unwrap(), "0");
    }

    #[test]
    fn test_long_numerals_do_not_overflow() {
        assert_eq!(
            normalize_version("99999999999999999999").unwrap(),
            "99999999999999999999"
        );
        assert_eq!(normalize_version("v000123456789012345678901").unwrap(), "123456789012345678901");
    }
}
