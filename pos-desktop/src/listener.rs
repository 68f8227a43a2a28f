//! Listener building the initial scene of the primary window.

use crate::config::PosConfigProvider;
use crate::controller::MainController;
use crate::event::{StageReadyEvent, StageReadyListener};
use crate::stage::Scene;
use crate::view::{ViewBinder, ViewBinderExt};
use springtime_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
use springtime_di::{component_alias, Component};
use std::sync::Arc;
use tracing::info;

/// Loads the main view into the primary window, titles and shows it. The title is read from
/// configuration once, when the listener is created.
#[derive(Component)]
#[component(
    constructor = "PrimaryStageListener::new",
    constructor_parameters = "dyn PosConfigProvider + Send + Sync"
)]
pub struct PrimaryStageListener {
    view_binder: ComponentInstancePtr<dyn ViewBinder + Send + Sync>,
    #[component(ignore)]
    title: String,
}

impl PrimaryStageListener {
    pub fn new(
        view_binder: ComponentInstancePtr<dyn ViewBinder + Send + Sync>,
        config_provider: ComponentInstancePtr<dyn PosConfigProvider + Send + Sync>,
    ) -> Result<Self, ErrorPtr> {
        let title = config_provider.config()?.app.title.clone();
        Ok(Self { view_binder, title })
    }
}

#[component_alias]
impl StageReadyListener for PrimaryStageListener {
    fn on_stage_ready(&self, event: &mut StageReadyEvent<'_>) -> Result<(), ErrorPtr> {
        let root = self
            .view_binder
            .load::<MainController>()
            .map_err(|error| Arc::new(error) as ErrorPtr)?;

        info!("Showing main view.");

        let stage = event.stage();
        stage.set_scene(Scene::new(root));
        stage.set_title(&self.title);
        stage.show();

        Ok(())
    }
}
