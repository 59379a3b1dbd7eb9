use crate::api::{ApiError, CreateSubsystemRequest, NvmeofApi};
use crate::form::validators::{ExistenceCheck, Unique, Validator};
use crate::form::{ActionLabel, ControlStatus, FieldErrors, FormControl, FormError, UrlVerb};
use crate::navigation::{Navigator, Route};
use crate::nqn::{NQN_MAX_BYTES, NQN_REGEX, default_nqn_now};
use crate::permissions::{Permission, PermissionStore};
use crate::tasks::{FinishedTask, TaskWrapper};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

pub const MAX_NAMESPACES_LIMIT: i64 = 256;
pub const SUBSYSTEMS_PAGE_URL: &str = "block/nvmeof/subsystems";
const MODAL_OUTLET: &str = "modal";

/// Existence lookup backed by the subsystem endpoint.
pub struct SubsystemPresence(pub Arc<dyn NvmeofApi>);

#[async_trait]
impl ExistenceCheck for SubsystemPresence {
    async fn is_present(&self, value: &str) -> Result<bool, ApiError> {
        self.0.is_subsystem_present(value).await
    }
}

#[derive(TypedBuilder)]
pub struct SubsystemFormParams {
    api: Arc<dyn NvmeofApi>,
    permissions: Arc<dyn PermissionStore>,
    task_wrapper: TaskWrapper,
    navigator: Arc<dyn Navigator>,
    #[builder(default)]
    debounce: Duration,
    /// Seed for the identifier field; a timestamped NQN when absent.
    #[builder(default, setter(strip_option, into))]
    initial_nqn: Option<String>,
}

/// Form creating a new NVMe-oF subsystem.
pub struct SubsystemForm {
    permission: Permission,
    action: ActionLabel,
    resource: &'static str,
    page_url: &'static str,
    nqn: FormControl,
    max_namespaces: FormControl,
    submit_error: bool,
    api: Arc<dyn NvmeofApi>,
    task_wrapper: TaskWrapper,
    navigator: Arc<dyn Navigator>,
}

impl SubsystemForm {
    pub fn initialize(params: SubsystemFormParams) -> Self {
        let permission = params.permissions.permissions().nvmeof();
        let initial_nqn = params.initial_nqn.unwrap_or_else(default_nqn_now);

        let nqn = FormControl::new("nqn", initial_nqn)
            .with_validators(vec![
                Validator::Required,
                Validator::Pattern(NQN_REGEX.clone()),
                Validator::MaxBytes(NQN_MAX_BYTES),
            ])
            .with_async_validator(Arc::new(
                Unique::new(Arc::new(SubsystemPresence(params.api.clone())))
                    .with_debounce(params.debounce),
            ));

        let max_namespaces = FormControl::new("max_namespaces", MAX_NAMESPACES_LIMIT.to_string())
            .with_validators(vec![
                Validator::Integer {
                    allow_negative: false,
                },
                Validator::Max(MAX_NAMESPACES_LIMIT),
                Validator::Min(1),
            ]);

        debug!("Initialized subsystem form with NQN {}", nqn.value());

        Self {
            permission,
            action: ActionLabel::Create,
            resource: "Subsystem",
            page_url: SUBSYSTEMS_PAGE_URL,
            nqn,
            max_namespaces,
            submit_error: false,
            api: params.api,
            task_wrapper: params.task_wrapper,
            navigator: params.navigator,
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn action(&self) -> ActionLabel {
        self.action
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn nqn(&self) -> &FormControl {
        &self.nqn
    }

    pub fn max_namespaces(&self) -> &FormControl {
        &self.max_namespaces
    }

    /// Editing a field clears the error of the previous submission.
    pub fn set_nqn<S: Into<String>>(&mut self, value: S) {
        self.submit_error = false;
        self.nqn.set_value(value);
    }

    pub fn set_max_namespaces<S: Into<String>>(&mut self, value: S) {
        self.submit_error = false;
        self.max_namespaces.set_value(value);
    }

    /// Form-level error raised by the last failed submission.
    pub fn has_submit_error(&self) -> bool {
        self.submit_error
    }

    pub fn errors(&self) -> FieldErrors {
        [&self.nqn, &self.max_namespaces]
            .into_iter()
            .filter(|control| !control.errors().is_empty())
            .map(|control| (control.name(), control.errors().to_vec()))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.nqn.is_valid() && self.max_namespaces.is_valid()
    }

    /// Runs every validator, including the uniqueness lookup.
    pub async fn validate(&mut self) -> bool {
        let max_namespaces = self.max_namespaces.validate().await;
        let nqn = self.nqn.validate().await;
        nqn == ControlStatus::Valid && max_namespaces == ControlStatus::Valid
    }

    pub fn request(&self) -> CreateSubsystemRequest {
        CreateSubsystemRequest::from_form_values(self.nqn.value(), self.max_namespaces.value())
    }

    pub async fn submit(&mut self) -> Result<(), FormError> {
        self.submit_error = false;
        if !self.validate().await {
            let errors = self.errors();
            debug!("Not submitting invalid subsystem form: {:?}", errors);
            return Err(FormError::Invalid(errors));
        }

        let request = self.request();
        let task = FinishedTask::new(
            format!("nvmeof/subsystem/{}", UrlVerb::Create),
            json!({ "nqn": request.nqn }),
        );

        let result = self
            .task_wrapper
            .wrap_task_around_call(task, self.api.create_subsystem(&request))
            .await;

        match result {
            Ok(_) => {
                info!("Subsystem {} submitted", request.nqn);
                self.navigator
                    .navigate(
                        Route::builder()
                            .path(self.page_url)
                            .close_outlet(MODAL_OUTLET)
                            .build(),
                    )
                    .await;
                Ok(())
            }
            Err(err) => {
                warn!("Failed to create subsystem {}: {}", request.nqn, err);
                self.submit_error = true;
                Err(FormError::Submit(err))
            }
        }
    }
}
