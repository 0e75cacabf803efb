//! Input validation.
//!
//! [`validate`] runs before any renderer is touched: emptiness, registry
//! membership, length bounds, then a per-symbology charset check and, for the
//! EAN/UPC family, check digit verification.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationFailure;
use crate::types;

/// Outcome of a validation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the data can be encoded
    pub valid: bool,
    /// Why the data was rejected
    pub error: Option<ValidationFailure>,
    /// Number of characters, set on success
    pub length: Option<usize>,
    /// Registry charset description, set on success
    pub charset: Option<&'static str>,
}

impl ValidationResult {
    fn ok(length: usize, charset: &'static str) -> Self {
        Self {
            valid: true,
            error: None,
            length: Some(length),
            charset: Some(charset),
        }
    }

    fn fail(error: ValidationFailure) -> Self {
        Self {
            valid: false,
            error: Some(error),
            length: None,
            charset: None,
        }
    }

    /// Converts into a `Result`, yielding the failure on rejection.
    pub fn into_result(self) -> Result<Self, ValidationFailure> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

/// Checks `data` against the rules of `symbology`.
pub fn validate(data: &str, symbology: &str) -> ValidationResult {
    if data.is_empty() {
        return ValidationResult::fail(ValidationFailure::InvalidInput);
    }
    let Some(entry) = types::lookup(symbology) else {
        return ValidationResult::fail(ValidationFailure::UnknownType(symbology.to_string()));
    };

    let config = entry.config;
    let length = data.chars().count();
    if length < config.min_length || length > config.max_length {
        return ValidationResult::fail(ValidationFailure::Length {
            length,
            min: config.min_length,
            max: config.max_length,
        });
    }

    match check_symbology(data, symbology) {
        Ok(()) => ValidationResult::ok(length, config.charset),
        Err(error) => ValidationResult::fail(error),
    }
}

struct CharsetRule {
    name: &'static str,
    pattern: Regex,
    accepts: &'static str,
}

fn rule(name: &'static str, pattern: &str, accepts: &'static str) -> CharsetRule {
    CharsetRule {
        name,
        // patterns are literals
        pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("bad pattern for {name}: {e}")),
        accepts,
    }
}

static CODE128: Lazy<CharsetRule> =
    Lazy::new(|| rule("Code 128", r"^[\x00-\x7F]+$", "ASCII characters only"));
static CODE128A: Lazy<CharsetRule> = Lazy::new(|| {
    rule("Code 128A", r"^[\x00-\x5F]+$", "uppercase letters, digits, punctuation and control characters")
});
static CODE128B: Lazy<CharsetRule> =
    Lazy::new(|| rule("Code 128B", r"^[\x20-\x7F]+$", "printable ASCII characters"));
static CODE128C: Lazy<CharsetRule> =
    Lazy::new(|| rule("Code 128C", r"^(?:[0-9]{2})+$", "an even number of digits"));
static CODE39: Lazy<CharsetRule> = Lazy::new(|| {
    rule("Code 39", r"^[0-9A-Z\-. $/+%]+$", "uppercase letters, digits and - . $ / + % space")
});
static CODE93: Lazy<CharsetRule> = Lazy::new(|| {
    rule("Code 93", r"^[0-9A-Z\-. $/+%]+$", "uppercase letters, digits and - . $ / + % space")
});
static EAN13: Lazy<CharsetRule> = Lazy::new(|| rule("EAN-13", r"^[0-9]{12,13}$", "12 or 13 digits"));
static EAN8: Lazy<CharsetRule> = Lazy::new(|| rule("EAN-8", r"^[0-9]{7,8}$", "7 or 8 digits"));
static EAN5: Lazy<CharsetRule> = Lazy::new(|| rule("EAN-5", r"^[0-9]{5}$", "exactly 5 digits"));
static EAN2: Lazy<CharsetRule> = Lazy::new(|| rule("EAN-2", r"^[0-9]{2}$", "exactly 2 digits"));
static UPCA: Lazy<CharsetRule> = Lazy::new(|| rule("UPC-A", r"^[0-9]{11,12}$", "11 or 12 digits"));
static UPCE: Lazy<CharsetRule> = Lazy::new(|| rule("UPC-E", r"^[0-9]{6,8}$", "6 to 8 digits"));
static ITF: Lazy<CharsetRule> =
    Lazy::new(|| rule("ITF", r"^(?:[0-9]{2})+$", "an even number of digits"));
static ITF14: Lazy<CharsetRule> = Lazy::new(|| rule("ITF-14", r"^[0-9]{13,14}$", "13 or 14 digits"));
static CODABAR: Lazy<CharsetRule> = Lazy::new(|| {
    rule(
        "Codabar",
        r"^[A-Da-d]?[0-9\-$:/.+]+[A-Da-d]?$",
        "digits and - $ : / . + with optional A-D start/stop characters",
    )
});
static NUMERIC: Lazy<CharsetRule> = Lazy::new(|| rule("Numeric", r"^[0-9]+$", "digits only"));

fn check_charset(rule: &CharsetRule, data: &str) -> Result<(), ValidationFailure> {
    if rule.pattern.is_match(data) {
        Ok(())
    } else {
        Err(ValidationFailure::Charset {
            symbology: rule.name.to_string(),
            charset: rule.accepts.to_string(),
        })
    }
}

fn check_symbology(data: &str, symbology: &str) -> Result<(), ValidationFailure> {
    match symbology {
        "code128" | "gs1_128" => check_charset(&CODE128, data),
        "code128a" => check_charset(&CODE128A, data),
        "code128b" => check_charset(&CODE128B, data),
        "code128c" => check_charset(&CODE128C, data),
        "code39" => check_charset(&CODE39, data),
        "code93" => check_charset(&CODE93, data),
        "ean13" => {
            check_charset(&EAN13, data)?;
            verify_trailing_check_digit(data, 13)
        }
        "ean8" => {
            check_charset(&EAN8, data)?;
            verify_trailing_check_digit(data, 8)
        }
        "upca" => {
            check_charset(&UPCA, data)?;
            verify_trailing_check_digit(data, 12)
        }
        "ean5" => check_charset(&EAN5, data),
        "ean2" => check_charset(&EAN2, data),
        "upce" => check_charset(&UPCE, data),
        "itf" => check_charset(&ITF, data),
        "itf14" => {
            check_charset(&ITF14, data)?;
            verify_trailing_check_digit(data, 14)
        }
        "codabar" => check_charset(&CODABAR, data),
        "msi" | "msi10" | "msi11" | "msi1010" | "msi1110" | "postnet" | "planet" | "onecode" => {
            check_charset(&NUMERIC, data)
        }
        "pharmacode" => {
            check_charset(&NUMERIC, data)?;
            match data.parse::<u32>() {
                Ok(value) if (3..=131_070).contains(&value) => Ok(()),
                _ => Err(ValidationFailure::Value(
                    "pharmacode value must be between 3 and 131070".to_string(),
                )),
            }
        }
        // Registered types without a dedicated checker only need non-empty data.
        _ => Ok(()),
    }
}

/// When `data` has exactly `full_length` digits its last digit must equal the
/// check digit computed over the others.
fn verify_trailing_check_digit(data: &str, full_length: usize) -> Result<(), ValidationFailure> {
    if !data.is_ascii() {
        return Err(ValidationFailure::InvalidInput);
    }
    if data.len() != full_length {
        return Ok(());
    }
    let (payload, check) = data.split_at(full_length - 1);
    let expected = check_digit(payload).ok_or(ValidationFailure::InvalidInput)?;
    let found = check
        .bytes()
        .next()
        .map(|b| b - b'0')
        .ok_or(ValidationFailure::InvalidInput)?;
    if expected == found {
        Ok(())
    } else {
        Err(ValidationFailure::Checksum { expected, found })
    }
}

/// GS1 modulo-10 check digit over a string of digits.
///
/// Weights alternate 3 and 1 starting from the rightmost payload digit, which
/// gives weight 1 to the first digit of a 12 digit EAN-13 payload and weight 3
/// to the first digit of a 7 digit EAN-8 payload. Returns `None` if `payload`
/// contains anything but ASCII digits.
pub fn check_digit(payload: &str) -> Option<u8> {
    let mut sum: u32 = 0;
    for (i, b) in payload.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return None;
        }
        let weight = if i % 2 == 0 { 3 } else { 1 };
        sum += u32::from(b - b'0') * weight;
    }
    Some(((10 - sum % 10) % 10) as u8)
}

/// Check digit for the first 12 digits of an EAN-13.
pub fn ean13_check_digit(first12: &str) -> Option<u8> {
    (first12.len() == 12).then(|| check_digit(first12)).flatten()
}

/// Check digit for the first 7 digits of an EAN-8.
pub fn ean8_check_digit(first7: &str) -> Option<u8> {
    (first7.len() == 7).then(|| check_digit(first7)).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ean13_check_digit() {
        assert_eq!(ean13_check_digit("123456789012"), Some(8));
        assert_eq!(ean13_check_digit("590123412345"), Some(7));
        assert_eq!(ean13_check_digit("400638133393"), Some(1));
        assert_eq!(ean13_check_digit("12345"), None);
        assert_eq!(ean13_check_digit("12345678901a"), None);
    }

    #[test]
    fn test_ean8_check_digit() {
        assert_eq!(ean8_check_digit("9638507"), Some(4));
        assert_eq!(ean8_check_digit("5512345"), Some(7));
    }

    #[test]
    fn test_valid_ean13() {
        let result = validate("1234567890128", "ean13");
        assert_eq!(
            result,
            ValidationResult {
                valid: true,
                error: None,
                length: Some(13),
                charset: Some("Numeric"),
            }
        );
        // Without check digit there is nothing to verify.
        assert!(validate("123456789012", "ean13").valid);
    }

    #[test]
    fn test_wrong_ean13_check_digit() {
        let result = validate("1234567890120", "ean13");
        assert!(!result.valid);
        assert_eq!(
            result.error,
            Some(ValidationFailure::Checksum { expected: 8, found: 0 })
        );
    }

    #[test]
    fn test_ean8_and_upca_check_digits() {
        assert!(validate("96385074", "ean8").valid);
        assert!(matches!(
            validate("96385070", "ean8").error,
            Some(ValidationFailure::Checksum { .. })
        ));
        assert!(validate("036000291452", "upca").valid);
        assert!(!validate("036000291450", "upca").valid);
    }

    #[test]
    fn test_empty_data() {
        let result = validate("", "code128");
        assert!(!result.valid);
        assert_eq!(result.error, Some(ValidationFailure::InvalidInput));
        assert!(result.error.unwrap().to_string().contains("non-empty"));
    }

    #[test]
    fn test_too_short() {
        let result = validate("123", "ean13");
        assert_eq!(
            result.error,
            Some(ValidationFailure::Length { length: 3, min: 12, max: 13 })
        );
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            validate("abc", "code42").error,
            Some(ValidationFailure::UnknownType("code42".to_string()))
        );
    }

    #[test]
    fn test_charset_rules() {
        assert!(validate("HELLO-123", "code39").valid);
        assert!(matches!(
            validate("hello", "code39").error,
            Some(ValidationFailure::Charset { .. })
        ));
        assert!(validate("Hello, World!", "code128").valid);
        assert!(!validate("héllo", "code128").valid);
        assert!(validate("123456", "code128c").valid);
        assert!(!validate("12345", "code128c").valid);
        assert!(!validate("12345678901a", "ean13").valid);
        assert!(validate("A40156B", "codabar").valid);
        assert!(!validate("12345", "itf").valid);
    }

    #[test]
    fn test_pharmacode_range() {
        assert!(validate("1234", "pharmacode").valid);
        assert!(matches!(
            validate("2", "pharmacode").error,
            Some(ValidationFailure::Value(_))
        ));
        assert!(!validate("200000", "pharmacode").valid);
    }

    #[test]
    fn test_unrestricted_types() {
        let result = validate("Any text, even ünïcödé", "qrcode");
        assert!(result.valid);
        assert_eq!(result.charset, Some("Any"));
        // Registered but without a dedicated checker.
        assert!(validate("ABC123", "royalmail").valid);
    }

    #[test]
    fn test_non_ascii_digits_are_rejected() {
        // Arabic-Indic digits are Unicode digits but not encodable ones.
        let mixed = validate("12345678901\u{0662}", "ean13");
        assert!(!mixed.valid);
        assert!(matches!(mixed.error, Some(ValidationFailure::Charset { .. })));

        let arabic = "\u{0661}".repeat(13);
        assert!(!validate(&arabic, "ean13").valid);
        assert!(!validate(&"\u{0661}".repeat(8), "ean8").valid);
        assert!(!validate(&"\u{0661}".repeat(14), "itf14").valid);
        assert!(!validate("\u{0663}\u{0664}", "itf").valid);
        assert!(!validate("\u{0663}\u{0664}", "code128c").valid);
        assert!(!validate("\u{0663}\u{0664}\u{0665}", "msi10").valid);
        assert!(!validate("\u{0663}\u{0664}\u{0665}", "pharmacode").valid);
    }

    #[test]
    fn test_trailing_check_digit_rejects_non_ascii() {
        assert_eq!(
            verify_trailing_check_digit("\u{0661}\u{0662}", 13),
            Err(ValidationFailure::InvalidInput)
        );
        assert_eq!(verify_trailing_check_digit("1234567890128", 13), Ok(()));
    }

    #[test]
    fn test_into_result() {
        assert!(validate("ABC", "code128").into_result().is_ok());
        assert!(validate("", "code128").into_result().is_err());
    }
}
