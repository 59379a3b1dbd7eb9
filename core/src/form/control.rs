use crate::form::validators::{AsyncValidator, FieldError, Validator, run_validators};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use strum::Display;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ControlStatus {
    Valid,
    Invalid,
    Pending,
}

/// A single input of a form: raw text plus the validators guarding it.
///
/// Synchronous validators run whenever the value changes. The asynchronous
/// validator only runs from [`FormControl::validate`], after every synchronous
/// validator passed, and is skipped while the control is pristine or empty.
pub struct FormControl {
    name: &'static str,
    value: String,
    pristine: bool,
    validators: Vec<Validator>,
    async_validator: Option<Arc<dyn AsyncValidator>>,
    errors: Vec<FieldError>,
    status: ControlStatus,
}

impl Debug for FormControl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormControl")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("pristine", &self.pristine)
            .field("errors", &self.errors)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl FormControl {
    pub fn new<S: Into<String>>(name: &'static str, value: S) -> Self {
        Self {
            name,
            value: value.into(),
            pristine: true,
            validators: Vec::new(),
            async_validator: None,
            errors: Vec::new(),
            status: ControlStatus::Valid,
        }
    }

    #[must_use]
    pub fn with_validators(mut self, validators: Vec<Validator>) -> Self {
        self.validators = validators;
        self.validate_sync();
        self
    }

    #[must_use]
    pub fn with_async_validator(mut self, validator: Arc<dyn AsyncValidator>) -> Self {
        self.async_validator = Some(validator);
        self.validate_sync();
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    pub fn status(&self) -> ControlStatus {
        self.status
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.status == ControlStatus::Valid
    }

    pub fn has_error(&self, key: &str) -> bool {
        self.errors.iter().any(|err| err.key() == key)
    }

    pub fn set_value<S: Into<String>>(&mut self, value: S) {
        self.value = value.into();
        self.pristine = false;
        self.validate_sync();
    }

    fn needs_async_check(&self) -> bool {
        self.async_validator.is_some() && !self.pristine && !self.value.is_empty()
    }

    pub fn validate_sync(&mut self) -> ControlStatus {
        self.errors = run_validators(&self.validators, &self.value);
        self.status = if !self.errors.is_empty() {
            ControlStatus::Invalid
        } else if self.needs_async_check() {
            ControlStatus::Pending
        } else {
            ControlStatus::Valid
        };

        trace!(
            "Control '{}' is {} after synchronous validation",
            self.name, self.status
        );
        self.status
    }

    pub async fn validate(&mut self) -> ControlStatus {
        if self.validate_sync() != ControlStatus::Pending {
            return self.status;
        }

        if let Some(validator) = self.async_validator.clone() {
            if let Some(err) = validator.validate(&self.value).await {
                self.errors.push(err);
                self.status = ControlStatus::Invalid;
            } else {
                self.status = ControlStatus::Valid;
            }
        }

        trace!("Control '{}' is {}", self.name, self.status);
        self.status
    }
}
