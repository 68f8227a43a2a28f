use pos_desktop::application::{self, ApplicationError, Lifecycle};
use pos_desktop::context::{ComponentContext, DisposableComponent};
use springtime_di::instance_provider::ErrorPtr;
use springtime_di::{component_alias, Component};
use std::io;
use std::sync::Arc;

#[derive(Component)]
#[component(constructor = "BrokenDisposable::new")]
struct BrokenDisposable;

impl BrokenDisposable {
    fn new() -> Result<Self, ErrorPtr> {
        Err(Arc::new(io::Error::new(io::ErrorKind::NotFound, "cash drawer")) as ErrorPtr)
    }
}

#[component_alias]
impl DisposableComponent for BrokenDisposable {
    fn destroy(&self) -> Result<(), ErrorPtr> {
        Ok(())
    }
}

#[test]
fn should_fail_startup_when_disposable_cannot_be_created() {
    assert!(matches!(
        ComponentContext::new(),
        Err(ApplicationError::ContextStartupError(_))
    ));
}

#[test]
fn should_fail_init_when_disposable_cannot_be_created() {
    let mut application = application::create_default();

    assert!(matches!(
        application.init().unwrap_err(),
        ApplicationError::ContextStartupError(_)
    ));
}
