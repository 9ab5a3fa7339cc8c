use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating phone-like contact values
    /// Digits with optional leading +, separators allowed
    /// - Valid: "+919876543210", "011-2345-6789", "999"
    /// - Invalid: "call me", "", "++91"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 ()\-]{1,19}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_regex_valid() {
        assert!(PHONE_REGEX.is_match("+919876543210"));
        assert!(PHONE_REGEX.is_match("011-2345-6789"));
        assert!(PHONE_REGEX.is_match("999"));
        assert!(PHONE_REGEX.is_match("(011) 234 5678"));
    }

    #[test]
    fn test_phone_regex_invalid() {
        assert!(!PHONE_REGEX.is_match("call me"));
        assert!(!PHONE_REGEX.is_match(""));
        assert!(!PHONE_REGEX.is_match("++91"));
        assert!(!PHONE_REGEX.is_match("9")); // too short
    }
}
