//! Core application lifecycle functionality.
//!
//! The GUI toolkit drives the application through the [Lifecycle] callbacks: `init` before any
//! window exists, `start` with the primary window, and `stop` when the toolkit shuts down.
//! [PosApplication] maps them onto the [ApplicationContext](crate::context::ApplicationContext):
//! the context is built on `init`, receives a [StageReadyEvent] on `start` and is closed on `stop`.

use crate::context::{ApplicationContextPtr, ComponentContextBuilder, ContextBuilder};
use crate::event::StageReadyEvent;
use crate::stage::{Platform, Stage};
use springtime_di::instance_provider::{ComponentInstanceProviderError, ErrorPtr};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Error starting application context: {0}")]
    ContextStartupError(ErrorPtr),
    #[error("Error closing application context: {0}")]
    ContextCloseError(ErrorPtr),
    #[error("Error retrieving components: {0}")]
    ComponentInjectionError(ComponentInstanceProviderError),
    #[error("Stage listener error: {0}")]
    ListenerError(ErrorPtr),
    #[error("Application context is not available")]
    ContextUnavailable,
    #[error("Primary stage has already been published")]
    StageAlreadyPublished,
}

/// Callbacks invoked by the GUI toolkit, in order: [init](Lifecycle::init) once,
/// [start](Lifecycle::start) once init succeeds and [stop](Lifecycle::stop) on shutdown.
pub trait Lifecycle {
    /// Prepares the application before any window is created. An error prevents the toolkit from
    /// starting.
    fn init(&mut self) -> Result<(), ApplicationError>;

    /// Called on the UI thread with the primary window.
    fn start(&mut self, stage: &mut dyn Stage) -> Result<(), ApplicationError>;

    /// Releases application resources and signals the toolkit to exit.
    fn stop(&mut self, platform: &dyn Platform) -> Result<(), ApplicationError>;
}

/// Main entrypoint for the application. Owns the application context between
/// [init](Lifecycle::init) and [stop](Lifecycle::stop) and hands the primary window to stage
/// listeners.
pub struct PosApplication<CB: ContextBuilder> {
    context_builder: CB,
    context: Option<ApplicationContextPtr>,
    stage_published: bool,
}

impl<CB: ContextBuilder> PosApplication<CB> {
    pub fn new(context_builder: CB) -> Self {
        Self {
            context_builder,
            context: None,
            stage_published: false,
        }
    }
}

/// Creates an application using the default component context.
pub fn create_default() -> PosApplication<ComponentContextBuilder> {
    PosApplication::new(ComponentContextBuilder)
}

impl<CB: ContextBuilder> Lifecycle for PosApplication<CB> {
    fn init(&mut self) -> Result<(), ApplicationError> {
        if self.context.is_some() {
            warn!("Application context already initialized.");
            return Ok(());
        }

        info!("Initializing application context...");

        self.context = Some(self.context_builder.build_context()?);
        Ok(())
    }

    fn start(&mut self, stage: &mut dyn Stage) -> Result<(), ApplicationError> {
        if self.stage_published {
            return Err(ApplicationError::StageAlreadyPublished);
        }

        let context = self
            .context
            .as_mut()
            .ok_or(ApplicationError::ContextUnavailable)?;

        self.stage_published = true;

        info!("Primary stage ready.");

        context.publish_stage_ready(&mut StageReadyEvent::new(stage))
    }

    fn stop(&mut self, platform: &dyn Platform) -> Result<(), ApplicationError> {
        let result = match self.context.take() {
            Some(mut context) => context.close(),
            None => {
                debug!("No application context to close.");
                Ok(())
            }
        };

        if let Err(error) = &result {
            error!("{}", error);
        }

        info!("Signalling application exit.");
        platform.exit();

        result
    }
}

#[cfg(test)]
mod tests {
    use crate::application::{ApplicationError, Lifecycle, PosApplication};
    use crate::context::{ApplicationContext, ApplicationContextPtr, ContextBuilder};
    use crate::event::StageReadyEvent;
    use crate::stage::{MockPlatform, MockStage};
    use springtime_di::instance_provider::ErrorPtr;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum Call {
        Build,
        Publish,
        Close,
    }

    type CallLog = Arc<Mutex<Vec<Call>>>;

    fn test_error(message: &str) -> ErrorPtr {
        Arc::new(io::Error::new(io::ErrorKind::Other, message.to_string())) as ErrorPtr
    }

    #[derive(Default, Clone)]
    struct TestBehavior {
        fail_build: bool,
        fail_publish: bool,
        fail_close: bool,
    }

    struct TestContext {
        calls: CallLog,
        behavior: TestBehavior,
    }

    impl ApplicationContext for TestContext {
        fn publish_stage_ready(
            &mut self,
            event: &mut StageReadyEvent<'_>,
        ) -> Result<(), ApplicationError> {
            self.calls.lock().unwrap().push(Call::Publish);
            if self.behavior.fail_publish {
                return Err(ApplicationError::ListenerError(test_error("view")));
            }

            event.stage().show();
            Ok(())
        }

        fn close(&mut self) -> Result<(), ApplicationError> {
            self.calls.lock().unwrap().push(Call::Close);
            if self.behavior.fail_close {
                return Err(ApplicationError::ContextCloseError(test_error("close")));
            }

            Ok(())
        }
    }

    struct TestContextBuilder {
        calls: CallLog,
        behavior: TestBehavior,
    }

    impl ContextBuilder for TestContextBuilder {
        fn build_context(&self) -> Result<ApplicationContextPtr, ApplicationError> {
            self.calls.lock().unwrap().push(Call::Build);
            if self.behavior.fail_build {
                return Err(ApplicationError::ContextStartupError(test_error("build")));
            }

            Ok(Box::new(TestContext {
                calls: self.calls.clone(),
                behavior: self.behavior.clone(),
            }))
        }
    }

    fn create_application(behavior: TestBehavior) -> (PosApplication<TestContextBuilder>, CallLog) {
        let calls = CallLog::default();
        let application = PosApplication::new(TestContextBuilder {
            calls: calls.clone(),
            behavior,
        });
        (application, calls)
    }

    fn exiting_platform(times: usize) -> MockPlatform {
        let mut platform = MockPlatform::new();
        platform.expect_exit().times(times).return_const(());
        platform
    }

    fn showing_stage(times: usize) -> MockStage {
        let mut stage = MockStage::new();
        stage.expect_show().times(times).return_const(());
        stage
    }

    #[test]
    fn should_run_full_lifecycle() {
        let (mut application, calls) = create_application(Default::default());
        let mut stage = showing_stage(1);

        application.init().unwrap();
        application.start(&mut stage).unwrap();
        application.stop(&exiting_platform(1)).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            [Call::Build, Call::Publish, Call::Close]
        );
    }

    #[test]
    fn should_not_publish_after_failed_init() {
        let (mut application, calls) = create_application(TestBehavior {
            fail_build: true,
            ..Default::default()
        });
        let mut stage = showing_stage(0);

        assert!(matches!(
            application.init().unwrap_err(),
            ApplicationError::ContextStartupError(_)
        ));
        assert!(matches!(
            application.start(&mut stage).unwrap_err(),
            ApplicationError::ContextUnavailable
        ));
        assert_eq!(*calls.lock().unwrap(), [Call::Build]);
    }

    #[test]
    fn should_skip_close_without_context() {
        let (mut application, calls) = create_application(TestBehavior {
            fail_build: true,
            ..Default::default()
        });

        assert!(application.init().is_err());
        application.stop(&exiting_platform(1)).unwrap();

        assert_eq!(*calls.lock().unwrap(), [Call::Build]);
    }

    #[test]
    fn should_reject_second_start() {
        let (mut application, calls) = create_application(Default::default());
        let mut stage = showing_stage(1);

        application.init().unwrap();
        application.start(&mut stage).unwrap();
        assert!(matches!(
            application.start(&mut stage).unwrap_err(),
            ApplicationError::StageAlreadyPublished
        ));

        assert_eq!(*calls.lock().unwrap(), [Call::Build, Call::Publish]);
    }

    #[test]
    fn should_close_context_after_listener_error() {
        let (mut application, calls) = create_application(TestBehavior {
            fail_publish: true,
            ..Default::default()
        });
        let mut stage = showing_stage(0);

        application.init().unwrap();
        assert!(matches!(
            application.start(&mut stage).unwrap_err(),
            ApplicationError::ListenerError(_)
        ));
        application.stop(&exiting_platform(1)).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            [Call::Build, Call::Publish, Call::Close]
        );
    }

    #[test]
    fn should_exit_when_close_fails() {
        let (mut application, calls) = create_application(TestBehavior {
            fail_close: true,
            ..Default::default()
        });
        let mut stage = showing_stage(1);

        application.init().unwrap();
        application.start(&mut stage).unwrap();
        assert!(matches!(
            application.stop(&exiting_platform(1)).unwrap_err(),
            ApplicationError::ContextCloseError(_)
        ));

        assert_eq!(
            *calls.lock().unwrap(),
            [Call::Build, Call::Publish, Call::Close]
        );
    }

    #[test]
    fn should_close_context_once() {
        let (mut application, calls) = create_application(Default::default());
        let platform = exiting_platform(2);

        application.init().unwrap();
        application.stop(&platform).unwrap();
        application.stop(&platform).unwrap();

        assert_eq!(*calls.lock().unwrap(), [Call::Build, Call::Close]);
    }

    #[test]
    fn should_not_rebuild_initialized_context() {
        let (mut application, calls) = create_application(Default::default());

        application.init().unwrap();
        application.init().unwrap();

        assert_eq!(*calls.lock().unwrap(), [Call::Build]);
    }
}
