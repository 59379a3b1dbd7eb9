use crate::api::ApiError;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoStaticStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors attached to a single form control.
///
/// The static key (`FieldError::key`) is what a hosting surface uses to pick
/// the inline message for a field.
#[derive(Debug, Clone, PartialEq, Eq, Error, IntoStaticStr)]
pub enum FieldError {
    #[strum(serialize = "required")]
    #[error("This field is required")]
    Required,
    #[strum(serialize = "pattern")]
    #[error("The value does not match the expected format")]
    Pattern,
    #[strum(serialize = "maxLength")]
    #[error("The value is {actual} bytes long, the maximum is {max}")]
    MaxLength { max: usize, actual: usize },
    #[strum(serialize = "number")]
    #[error("The value must be a whole number")]
    Number,
    #[strum(serialize = "min")]
    #[error("The value must be at least {min}")]
    Min { min: i64 },
    #[strum(serialize = "max")]
    #[error("The value must be at most {max}")]
    Max { max: i64 },
    #[strum(serialize = "notUnique")]
    #[error("The chosen value is already in use")]
    NotUnique,
    #[strum(serialize = "uniquenessCheckFailed")]
    #[error("Unable to check whether the value is already in use: {0}")]
    UniquenessCheckFailed(String),
}

impl FieldError {
    pub fn key(&self) -> &'static str {
        self.into()
    }
}

/// Synchronous predicates over the raw text of a control.
///
/// Everything except `Required` treats empty input as valid so optional
/// fields can be cleared.
#[derive(Debug, Clone)]
pub enum Validator {
    Required,
    Pattern(Regex),
    MaxBytes(usize),
    Integer { allow_negative: bool },
    Min(i64),
    Max(i64),
}

impl Validator {
    #[allow(clippy::cast_precision_loss)] // Bounds are small form limits
    pub fn validate(&self, value: &str) -> Option<FieldError> {
        match self {
            Self::Required => value.is_empty().then_some(FieldError::Required),
            _ if value.is_empty() => None,
            Self::Pattern(regex) => (!regex.is_match(value)).then_some(FieldError::Pattern),
            Self::MaxBytes(max) => (value.len() > *max).then(|| FieldError::MaxLength {
                max: *max,
                actual: value.len(),
            }),
            Self::Integer { allow_negative } => {
                let digits = match value.strip_prefix('-') {
                    Some(rest) if *allow_negative => rest,
                    _ => value,
                };
                let is_integer = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
                (!is_integer).then_some(FieldError::Number)
            }
            Self::Min(min) => parse_number(value)
                .filter(|n| *n < *min as f64)
                .map(|_| FieldError::Min { min: *min }),
            Self::Max(max) => parse_number(value)
                .filter(|n| *n > *max as f64)
                .map(|_| FieldError::Max { max: *max }),
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Runs every validator in order and collects all failures.
pub fn run_validators(validators: &[Validator], value: &str) -> Vec<FieldError> {
    validators
        .iter()
        .filter_map(|validator| validator.validate(value))
        .collect()
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExistenceCheck: Send + Sync {
    async fn is_present(&self, value: &str) -> Result<bool, ApiError>;
}

#[async_trait]
pub trait AsyncValidator: Send + Sync {
    async fn validate(&self, value: &str) -> Option<FieldError>;
}

/// Rejects values the backend already knows about.
#[derive(Clone)]
pub struct Unique {
    lookup: Arc<dyn ExistenceCheck>,
    debounce: Duration,
}

impl Unique {
    pub fn new(lookup: Arc<dyn ExistenceCheck>) -> Self {
        Self {
            lookup,
            debounce: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[async_trait]
impl AsyncValidator for Unique {
    async fn validate(&self, value: &str) -> Option<FieldError> {
        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }

        match self.lookup.is_present(value).await {
            Ok(true) => {
                debug!("'{}' is already in use", value);
                Some(FieldError::NotUnique)
            }
            Ok(false) => None,
            Err(err) => {
                warn!("Uniqueness check for '{}' failed: {}", value, err);
                Some(FieldError::UniquenessCheckFailed(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nqn::NQN_REGEX;
    use mockall::predicate::eq;
    use rstest::rstest;

    #[rstest]
    #[case(Validator::Required, "", Some(FieldError::Required))]
    #[case(Validator::Required, "x", None)]
    #[case(Validator::Pattern(NQN_REGEX.clone()), "", None)]
    #[case(Validator::Pattern(NQN_REGEX.clone()), "nope", Some(FieldError::Pattern))]
    #[case(Validator::Pattern(NQN_REGEX.clone()), "nqn.2016-06.io.spdk:cnode1", None)]
    #[case(Validator::MaxBytes(3), "abc", None)]
    #[case(Validator::MaxBytes(3), "abé", Some(FieldError::MaxLength { max: 3, actual: 4 }))]
    #[case(Validator::Integer { allow_negative: false }, "", None)]
    #[case(Validator::Integer { allow_negative: false }, "256", None)]
    #[case(Validator::Integer { allow_negative: false }, "-1", Some(FieldError::Number))]
    #[case(Validator::Integer { allow_negative: true }, "-1", None)]
    #[case(Validator::Integer { allow_negative: false }, "2.5", Some(FieldError::Number))]
    #[case(Validator::Integer { allow_negative: false }, "abc", Some(FieldError::Number))]
    #[case(Validator::Min(1), "", None)]
    #[case(Validator::Min(1), "0", Some(FieldError::Min { min: 1 }))]
    #[case(Validator::Min(1), "1", None)]
    #[case(Validator::Min(1), "abc", None)]
    #[case(Validator::Max(256), "256", None)]
    #[case(Validator::Max(256), "257", Some(FieldError::Max { max: 256 }))]
    #[case(Validator::Max(256), "256.5", Some(FieldError::Max { max: 256 }))]
    #[case(Validator::Min(1), "0.5", Some(FieldError::Min { min: 1 }))]
    fn test_validator(
        #[case] validator: Validator,
        #[case] value: &str,
        #[case] expected: Option<FieldError>,
    ) {
        assert_eq!(validator.validate(value), expected);
    }

    #[test]
    fn test_run_validators_collects_every_failure() {
        let validators = [
            Validator::Integer {
                allow_negative: false,
            },
            Validator::Max(256),
            Validator::Min(1),
        ];

        assert_eq!(
            run_validators(&validators, "-3"),
            vec![FieldError::Number, FieldError::Min { min: 1 }]
        );
        assert!(run_validators(&validators, "12").is_empty());
    }

    #[test]
    fn test_error_keys() {
        assert_eq!(FieldError::Required.key(), "required");
        assert_eq!(FieldError::MaxLength { max: 1, actual: 2 }.key(), "maxLength");
        assert_eq!(FieldError::NotUnique.key(), "notUnique");
        assert_eq!(
            FieldError::UniquenessCheckFailed("boom".into()).key(),
            "uniquenessCheckFailed"
        );
    }

    #[tokio::test]
    async fn test_unique_reports_present_values() {
        let mut lookup = MockExistenceCheck::new();
        lookup
            .expect_is_present()
            .with(eq("taken"))
            .times(1)
            .returning(|_| Ok(true));

        let unique = Unique::new(Arc::new(lookup));
        assert_eq!(unique.validate("taken").await, Some(FieldError::NotUnique));
    }

    #[tokio::test]
    async fn test_unique_accepts_absent_values() {
        let mut lookup = MockExistenceCheck::new();
        lookup.expect_is_present().returning(|_| Ok(false));

        let unique = Unique::new(Arc::new(lookup));
        assert_eq!(unique.validate("free").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unique_waits_for_debounce() {
        let mut lookup = MockExistenceCheck::new();
        lookup.expect_is_present().returning(|_| Ok(false));

        let unique = Unique::new(Arc::new(lookup)).with_debounce(Duration::from_millis(500));
        let started = tokio::time::Instant::now();
        assert_eq!(unique.validate("free").await, None);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_unique_lookup_failure_blocks() {
        let mut lookup = MockExistenceCheck::new();
        lookup
            .expect_is_present()
            .returning(|_| Err(ApiError::Transport("connection refused".into())));

        let unique = Unique::new(Arc::new(lookup));
        assert!(matches!(
            unique.validate("x").await,
            Some(FieldError::UniquenessCheckFailed(_))
        ));
    }
}
