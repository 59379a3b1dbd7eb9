use async_trait::async_trait;
use getset::Getters;
use typed_builder::TypedBuilder;

/// Where the hosting surface should go next.
#[derive(TypedBuilder, Getters, Debug, Clone, PartialEq, Eq)]
pub struct Route {
    #[getset(get = "pub")]
    #[builder(setter(into))]
    path: String,

    /// Named outlet (e.g. a modal) to close while navigating.
    #[getset(get = "pub")]
    #[builder(default, setter(strip_option, into))]
    close_outlet: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, route: Route);
}
