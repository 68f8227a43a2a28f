//! Events published by the application host and their listeners.

use crate::stage::Stage;
use derive_more::Constructor;
use springtime_di::injectable;
pub use springtime_di::instance_provider::ErrorPtr;

pub type StageReadyListenerPtr = dyn StageReadyListener + Send + Sync;

/// Published once the toolkit provides the primary window. The window is only borrowed for the
/// duration of event dispatch.
#[derive(Constructor)]
pub struct StageReadyEvent<'a> {
    stage: &'a mut dyn Stage,
}

impl StageReadyEvent<'_> {
    /// The primary window.
    pub fn stage(&mut self) -> &mut dyn Stage {
        &mut *self.stage
    }
}

/// Reacts to the primary window becoming available. Listeners are discovered by the dependency
/// injection framework and invoked synchronously, on the UI thread, by the
/// [ApplicationContext](crate::context::ApplicationContext).
#[injectable]
pub trait StageReadyListener {
    fn on_stage_ready(&self, event: &mut StageReadyEvent<'_>) -> Result<(), ErrorPtr>;

    /// Returns the priority for this listener. Higher priorities get called first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}
