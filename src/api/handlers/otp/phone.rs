//! Phone number canonicalization.

/// Country code prefixed to bare 10-digit national numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Canonicalize a free-form phone number to `+<countrycode><digits>`.
///
/// Returns an empty string when the input cannot be a phone number; callers
/// must treat that as a validation failure.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> String {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix('+') {
        let digits = digits_only(rest);
        if digits.is_empty() {
            return String::new();
        }
        return format!("+{digits}");
    }

    let digits = digits_only(trimmed);
    match digits.len() {
        10 => format!("+{default_country_code}{digits}"),
        len if len >= 11 => format!("+{digits}"),
        _ => String::new(),
    }
}

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_national_number_gets_default_country_code() {
        assert_eq!(
            normalize_phone("9876543210", DEFAULT_COUNTRY_CODE),
            "+919876543210"
        );
    }

    #[test]
    fn international_number_keeps_plus_and_drops_punctuation() {
        assert_eq!(
            normalize_phone("+1 (415) 555-0100", DEFAULT_COUNTRY_CODE),
            "+14155550100"
        );
    }

    #[test]
    fn short_number_is_invalid() {
        assert_eq!(normalize_phone("123", DEFAULT_COUNTRY_CODE), "");
    }

    #[test]
    fn long_number_without_plus_is_treated_as_international() {
        assert_eq!(
            normalize_phone("919876543210", DEFAULT_COUNTRY_CODE),
            "+919876543210"
        );
    }

    #[test]
    fn formatted_national_number_is_accepted() {
        assert_eq!(
            normalize_phone(" 98765-43210 ", DEFAULT_COUNTRY_CODE),
            "+919876543210"
        );
    }

    #[test]
    fn plus_without_digits_is_invalid() {
        assert_eq!(normalize_phone("+", DEFAULT_COUNTRY_CODE), "");
        assert_eq!(normalize_phone("+ ( )", DEFAULT_COUNTRY_CODE), "");
    }

    #[test]
    fn empty_and_letters_are_invalid() {
        assert_eq!(normalize_phone("", DEFAULT_COUNTRY_CODE), "");
        assert_eq!(normalize_phone("call me", DEFAULT_COUNTRY_CODE), "");
    }

    #[test]
    fn configured_country_code_is_used() {
        assert_eq!(normalize_phone("4155550100", "1"), "+14155550100");
    }
}
