//! GUI toolkit integration based on [eframe]. The toolkit owns the UI thread and drives an
//! application through its [Lifecycle]: `init` runs before the native window is created, `start`
//! runs on the UI thread once the (still hidden) primary window exists, and `stop` runs from
//! [eframe::App::on_exit] while the toolkit is still alive. If `start` failed, no app exists and
//! `stop` runs after the event loop ends instead.

use crate::application::{ApplicationError, Lifecycle};
use crate::stage::{Platform, Scene, Stage};
use crate::view::{Node, ViewState};
use eframe::egui;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, error, info};

const APP_ID: &str = "pos-desktop";

/// Errors which prevent the application from running to a clean shutdown.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Error initializing application: {0}")]
    InitError(#[source] ApplicationError),
    #[error("GUI toolkit error: {0}")]
    ToolkitError(#[source] eframe::Error),
    #[error("Error stopping application: {0}")]
    StopError(#[source] ApplicationError),
}

/// Runs the application until its primary window closes. Must be called on the main thread, which
/// becomes the UI thread. Arguments are passed through untouched.
pub fn launch<A: Lifecycle + 'static>(application: A, args: Vec<String>) -> Result<(), LaunchError> {
    let application = Rc::new(RefCell::new(application));
    application
        .borrow_mut()
        .init()
        .map_err(LaunchError::InitError)?;

    debug!(?args, "Launching application.");

    let shutdown = Rc::new(RefCell::new(Shutdown::new(application.clone())));
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_visible(false),
        ..Default::default()
    };

    let run_result = {
        let shutdown = shutdown.clone();

        let app_creator: eframe::AppCreator = Box::new(move |creation_context| {
            let context = creation_context.egui_ctx.clone();
            shutdown.borrow().platform.attach(context.clone());

            let mut stage = EguiStage::new(context);
            application.borrow_mut().start(&mut stage)?;

            Ok(Box::new(PosShell { stage, shutdown }))
        });

        eframe::run_native(APP_ID, options, app_creator)
    };

    info!("Event loop finished.");

    // no-op when the shell already stopped the application in on_exit
    let stop_result = shutdown.borrow_mut().stop();
    run_result.map_err(LaunchError::ToolkitError)?;
    stop_result.map_err(LaunchError::StopError)
}

/// Stops the application at most once. The shell stops it while the event loop is still alive;
/// if the shell was never created, the launcher stops it after the loop ends.
struct Shutdown<A> {
    application: Rc<RefCell<A>>,
    platform: EframePlatform,
    result: Option<Result<(), ApplicationError>>,
}

impl<A: Lifecycle> Shutdown<A> {
    fn new(application: Rc<RefCell<A>>) -> Self {
        Self {
            application,
            platform: EframePlatform::default(),
            result: None,
        }
    }

    fn stop(&mut self) -> Result<(), ApplicationError> {
        self.result
            .get_or_insert_with(|| self.application.borrow_mut().stop(&self.platform))
            .clone()
    }
}

#[derive(Default)]
struct EframePlatform {
    context: RefCell<Option<egui::Context>>,
}

impl EframePlatform {
    fn attach(&self, context: egui::Context) {
        *self.context.borrow_mut() = Some(context);
    }
}

impl Platform for EframePlatform {
    fn exit(&self) {
        if let Some(context) = self.context.borrow().as_ref() {
            context.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

/// The primary window of an eframe application.
pub struct EguiStage {
    context: egui::Context,
    scene: Option<Scene>,
}

impl EguiStage {
    fn new(context: egui::Context) -> Self {
        Self {
            context,
            scene: None,
        }
    }
}

impl Stage for EguiStage {
    fn set_scene(&mut self, scene: Scene) {
        if let Some((width, height)) = scene.root().preferred_size() {
            self.context
                .send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(width, height)));
        }

        self.scene = Some(scene);
        self.context.request_repaint();
    }

    fn set_title(&mut self, title: &str) {
        self.context
            .send_viewport_cmd(egui::ViewportCommand::Title(title.to_string()));
    }

    fn show(&mut self) {
        self.context
            .send_viewport_cmd(egui::ViewportCommand::Visible(true));
        self.context.request_repaint();
    }
}

struct PosShell<A> {
    stage: EguiStage,
    shutdown: Rc<RefCell<Shutdown<A>>>,
}

impl<A: Lifecycle> eframe::App for PosShell<A> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Some(scene) = self.stage.scene.as_mut() else {
            return;
        };

        let mut actions = vec![];
        egui::CentralPanel::default().show(ctx, |ui| {
            let (root, state) = scene.root_mut().parts_mut();
            render_node(ui, root, state, &mut actions);
        });

        let root = scene.root_mut();
        for action in actions {
            if let Err(error) = root.fire(&action) {
                error!("Error handling action '{}': {}", action, error);
            }
        }

        if root.state_mut().take_close_request() {
            info!("Closing primary stage.");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(error) = self.shutdown.borrow_mut().stop() {
            error!("Error stopping application: {}", error);
        }
    }
}

fn render_node(ui: &mut egui::Ui, node: &Node, state: &mut ViewState, actions: &mut Vec<String>) {
    match node {
        Node::VBox { spacing, children } => {
            ui.vertical(|ui| {
                if *spacing > 0.0 {
                    ui.spacing_mut().item_spacing.y = *spacing;
                }
                for child in children {
                    render_node(ui, child, state, actions);
                }
            });
        }
        Node::HBox { spacing, children } => {
            ui.horizontal(|ui| {
                if *spacing > 0.0 {
                    ui.spacing_mut().item_spacing.x = *spacing;
                }
                for child in children {
                    render_node(ui, child, state, actions);
                }
            });
        }
        Node::Heading { text } => {
            ui.heading(text.as_str());
        }
        Node::Label { id, text } => {
            let text = id
                .as_deref()
                .and_then(|id| state.value(id))
                .unwrap_or(text.as_str());
            ui.label(text);
        }
        Node::TextField { id, prompt } => {
            ui.add(egui::TextEdit::singleline(state.value_mut(id)).hint_text(prompt.as_str()));
        }
        Node::Button { text, on_action } => {
            if ui.button(text.as_str()).clicked() {
                actions.push(on_action.clone());
            }
        }
        Node::Separator => {
            ui.separator();
        }
    }
}
