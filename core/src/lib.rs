#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::struct_field_names
)]

pub mod api;
pub mod config;
pub mod form;
pub mod instrumentation;
pub mod navigation;
pub mod nqn;
pub mod notifications;
pub mod permissions;
pub mod tasks;
