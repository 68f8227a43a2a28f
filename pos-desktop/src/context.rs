//! The application context owns the dependency injection container for the lifetime of the
//! application: it is built when the application initializes, dispatches application events to
//! listening components and disposes of components when closed.

use crate::application::ApplicationError;
use crate::config::PosConfigProvider;
use crate::event::{StageReadyEvent, StageReadyListenerPtr};
use springtime_di::component::Injectable;
use springtime_di::factory::{ComponentFactory, ComponentFactoryBuilder};
use springtime_di::injectable;
use springtime_di::instance_provider::{
    ComponentInstancePtr, ErrorPtr, TypedComponentInstanceProvider,
};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

pub type ApplicationContextPtr = Box<dyn ApplicationContext>;
pub type DisposableComponentPtr = dyn DisposableComponent + Send + Sync;

/// Container of application components.
pub trait ApplicationContext {
    /// Synchronously dispatches the event to all
    /// [StageReadyListeners](crate::event::StageReadyListener), stopping at the first error.
    fn publish_stage_ready(
        &mut self,
        event: &mut StageReadyEvent<'_>,
    ) -> Result<(), ApplicationError>;

    /// Releases all components. Closing an already closed context does nothing.
    fn close(&mut self) -> Result<(), ApplicationError>;
}

/// Creates [ApplicationContext]s.
pub trait ContextBuilder {
    fn build_context(&self) -> Result<ApplicationContextPtr, ApplicationError>;
}

/// Components which need to release resources when the context closes. Disposable components are
/// created when the context starts, so a construction failure is a startup error. All hooks are
/// called on close, even if some of them fail.
#[injectable]
pub trait DisposableComponent {
    fn destroy(&self) -> Result<(), ErrorPtr>;

    /// Returns the priority for this component. Higher priorities get destroyed first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}

/// [ApplicationContext] backed by a [ComponentFactory] with all statically registered components.
pub struct ComponentContext {
    factory: Option<ComponentFactory>,
    disposables: Vec<ComponentInstancePtr<DisposableComponentPtr>>,
}

impl ComponentContext {
    /// Creates the component factory and installs the tracing logger, if configured.
    pub fn new() -> Result<Self, ApplicationError> {
        let mut factory = ComponentFactoryBuilder::new()
            .map_err(|error| ApplicationError::ContextStartupError(Arc::new(error) as ErrorPtr))?
            .build();

        let config_provider = factory
            .primary_instance_typed::<dyn PosConfigProvider + Send + Sync>()
            .map_err(|error| ApplicationError::ContextStartupError(Arc::new(error) as ErrorPtr))?;
        let config = config_provider
            .config()
            .map_err(ApplicationError::ContextStartupError)?;

        if config.install_tracing_logger {
            install_tracing_logger();
        }

        let mut disposables = factory
            .instances_typed::<DisposableComponentPtr>()
            .map_err(|error| ApplicationError::ContextStartupError(Arc::new(error) as ErrorPtr))?;
        disposables.sort_by_key(|component| Reverse(component.priority()));

        info!("Application context started.");

        Ok(Self {
            factory: Some(factory),
            disposables,
        })
    }

    /// Returns the primary component of given type.
    pub fn primary_instance<T: Injectable + ?Sized>(
        &mut self,
    ) -> Result<ComponentInstancePtr<T>, ApplicationError> {
        self.factory_mut()?
            .primary_instance_typed::<T>()
            .map_err(ApplicationError::ComponentInjectionError)
    }

    fn factory_mut(&mut self) -> Result<&mut ComponentFactory, ApplicationError> {
        self.factory
            .as_mut()
            .ok_or(ApplicationError::ContextUnavailable)
    }
}

impl ApplicationContext for ComponentContext {
    fn publish_stage_ready(
        &mut self,
        event: &mut StageReadyEvent<'_>,
    ) -> Result<(), ApplicationError> {
        debug!("Searching for stage listeners...");

        let mut listeners = self
            .factory_mut()?
            .instances_typed::<StageReadyListenerPtr>()
            .map_err(ApplicationError::ComponentInjectionError)?;

        listeners.sort_by_key(|listener| Reverse(listener.priority()));

        info!("Publishing stage ready event to {} listeners...", listeners.len());

        for listener in &listeners {
            listener
                .on_stage_ready(event)
                .map_err(ApplicationError::ListenerError)?;
        }

        Ok(())
    }

    fn close(&mut self) -> Result<(), ApplicationError> {
        if self.factory.take().is_none() {
            debug!("Application context already closed.");
            return Ok(());
        }

        info!(
            "Closing application context with {} disposable components...",
            self.disposables.len()
        );

        let mut result = Ok(());
        for component in self.disposables.drain(..) {
            if let Err(error) = component.destroy() {
                error!("Error destroying component: {}", error);
                if result.is_ok() {
                    result = Err(ApplicationError::ContextCloseError(error));
                }
            }
        }

        result
    }
}

/// Builds [ComponentContext]s.
#[derive(Default, Copy, Clone, Debug)]
pub struct ComponentContextBuilder;

impl ContextBuilder for ComponentContextBuilder {
    fn build_context(&self) -> Result<ApplicationContextPtr, ApplicationError> {
        ComponentContext::new().map(|context| Box::new(context) as ApplicationContextPtr)
    }
}

fn install_tracing_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        debug!("Tracing logger already installed.");
    }
}
