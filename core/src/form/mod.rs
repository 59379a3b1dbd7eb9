mod control;
mod subsystem;
pub mod validators;

pub use control::{ControlStatus, FormControl};
pub use subsystem::{
    MAX_NAMESPACES_LIMIT, SUBSYSTEMS_PAGE_URL, SubsystemForm, SubsystemFormParams,
    SubsystemPresence,
};

use crate::api::ApiError;
use std::collections::BTreeMap;
use strum::Display;
use thiserror::Error;
use validators::FieldError;

/// Label of the action a form performs, as shown on its submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ActionLabel {
    Create,
}

/// Verb segment used in task names such as `nvmeof/subsystem/create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum UrlVerb {
    Create,
}

pub type FieldErrors = BTreeMap<&'static str, Vec<FieldError>>;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("The form has invalid fields: {}", describe(.0))]
    Invalid(FieldErrors),
    #[error("Submitting the form failed: {0}")]
    Submit(#[source] ApiError),
}

fn describe(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, errors)| {
            let keys: Vec<_> = errors.iter().map(FieldError::key).collect();
            format!("{field} ({})", keys.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
