use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// NVMe qualified name accepted for new subsystems.
///
/// `nqn.` followed by a `yyyy-mm` date (years 19xx/20xx), a two or three
/// character authority, one or more dotted labels and a single `:`-separated
/// identifier made of alphanumerics, dashes and dots. Authority characters
/// are Unicode scalar values, so an emoji counts once.
pub const NQN_PATTERN: &str =
    r"^nqn\.(19|20)[0-9]{2}-(0[1-9]|1[0-2])\.[^0-9]{2,3}(\.[A-Za-z0-9-]+)+(:[A-Za-z0-9.-]+)$";

/// Upper bound on the UTF-8 encoded length of an NQN.
pub const NQN_MAX_BYTES: usize = 223;

pub const DEFAULT_NQN_PREFIX: &str = "nqn.2001-07.com.ceph:";

pub static NQN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Constant pattern
    Regex::new(NQN_PATTERN).expect("NQN pattern must compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NqnError {
    #[error("NQN is required")]
    Empty,
    #[error("'{0}' is not a valid NQN")]
    Pattern(String),
    #[error("NQN is {len} bytes long, the maximum is {max}", max = NQN_MAX_BYTES)]
    TooLong { len: usize },
}

pub fn matches_pattern(value: &str) -> bool {
    NQN_REGEX.is_match(value)
}

pub fn exceeds_max_bytes(value: &str) -> bool {
    value.len() > NQN_MAX_BYTES
}

/// Seeds a fresh identifier from a millisecond timestamp.
pub fn default_nqn(epoch_millis: i64) -> String {
    format!("{DEFAULT_NQN_PREFIX}{epoch_millis}")
}

pub fn default_nqn_now() -> String {
    default_nqn(chrono::Utc::now().timestamp_millis())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Nqn(String);

impl Nqn {
    pub fn parse<S: AsRef<str>>(value: S) -> Result<Self, NqnError> {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(NqnError::Empty);
        }
        if !matches_pattern(value) {
            return Err(NqnError::Pattern(value.to_string()));
        }
        if exceeds_max_bytes(value) {
            return Err(NqnError::TooLong { len: value.len() });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Nqn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Nqn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Nqn {
    type Err = NqnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Nqn {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertables::{assert_err, assert_ok};
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("nqn.2001-07.com.ceph:1700000000000")]
    #[case("nqn.1999-12.org.example:target-1")]
    #[case("nqn.2016-06.io.spdk:cnode1")]
    #[case("nqn.2024-01.com.example.storage:disk.0")]
    fn test_valid_nqns(#[case] value: &str) {
        assert!(matches_pattern(value));
        let nqn = assert_ok!(Nqn::parse(value));
        assert_eq!(nqn.as_str(), value);
    }

    #[rstest]
    #[case("")]
    #[case("nqn.2001-07.com.ceph")]
    #[case("nqn.2001-13.com.ceph:x")]
    #[case("nqn.2001-00.com.ceph:x")]
    #[case("nqn.1899-07.com.ceph:x")]
    #[case("nqn.2001-7.com.ceph:x")]
    #[case("nqn.2001-07.12.ceph:x")]
    #[case("nqn.2001-07.com:x")]
    #[case("nqn.2001-07.com.ceph:")]
    #[case("nqn.2001-07.com.ceph:a_b")]
    #[case("nqn.2014-08.org.nvmexpress:uuid:1234")]
    #[case("NQN.2001-07.com.ceph:x")]
    #[case(" nqn.2001-07.com.ceph:x")]
    fn test_invalid_pattern(#[case] value: &str) {
        assert!(!matches_pattern(value));
        assert_err!(Nqn::parse(value));
    }

    #[rstest]
    #[case("nqn.2014-08.\u{1F600}\u{1F600}.example:a", true)]
    #[case("nqn.2014-08.\u{1F600}\u{1F600}\u{1F600}.example:a", true)]
    #[case("nqn.2014-08.\u{1F600}.example:a", false)]
    #[case("nqn.2014-08.\u{1F600}\u{1F600}\u{1F600}\u{1F600}.example:a", false)]
    fn test_authority_counts_characters(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(matches_pattern(value), expected);
    }

    #[test]
    fn test_empty_is_reported_as_empty() {
        assert_eq!(Nqn::parse(""), Err(NqnError::Empty));
    }

    #[test]
    fn test_byte_length_is_measured_in_utf8() {
        // 'é' is two bytes but one char
        let base = "nqn.2001-07.cé.ceph:";
        assert!(matches_pattern(&format!("{base}x")));

        let at_limit = format!("{base}{}", "a".repeat(NQN_MAX_BYTES - base.len()));
        assert_eq!(at_limit.len(), NQN_MAX_BYTES);
        assert_ok!(Nqn::parse(&at_limit));

        let over = format!("{at_limit}a");
        assert!(over.chars().count() < NQN_MAX_BYTES + 1);
        assert_eq!(Nqn::parse(&over), Err(NqnError::TooLong { len: 224 }));
    }

    #[test]
    fn test_default_nqn() {
        let value = default_nqn(1_700_000_000_000);
        assert_eq!(value, "nqn.2001-07.com.ceph:1700000000000");
        assert!(matches_pattern(&default_nqn_now()));
    }

    #[test]
    fn test_serde() {
        let nqn = assert_ok!(Nqn::parse("nqn.2016-06.io.spdk:cnode1"));
        let json = assert_ok!(serde_json::to_string(&nqn));
        assert_eq!(json, "\"nqn.2016-06.io.spdk:cnode1\"");

        let back: Nqn = assert_ok!(serde_json::from_str(&json));
        assert_eq!(back, nqn);

        assert_err!(serde_json::from_str::<Nqn>("\"not-an-nqn\""));
    }

    proptest! {
        #[test]
        fn test_default_nqn_always_matches(millis in 0i64..i64::MAX) {
            let value = default_nqn(millis);
            prop_assert!(matches_pattern(&value));
            prop_assert!(Nqn::parse(&value).is_ok());
        }

        #[test]
        fn test_strings_without_prefix_never_match(s in "[a-zA-Z0-9:.-]{0,64}") {
            prop_assume!(!s.starts_with("nqn."));
            prop_assert!(!matches_pattern(&s));
            prop_assert!(Nqn::parse(&s).is_err());
        }

        #[test]
        fn test_long_identifiers_are_rejected(len in (NQN_MAX_BYTES + 1)..512usize) {
            let value = format!("{DEFAULT_NQN_PREFIX}{}", "a".repeat(len - DEFAULT_NQN_PREFIX.len()));
            prop_assert!(matches_pattern(&value));
            prop_assert_eq!(Nqn::parse(&value), Err(NqnError::TooLong { len }));
        }
    }
}
