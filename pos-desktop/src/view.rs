//! Declarative views bound to [Controller]s.
//!
//! A view is a JSON document describing a tree of [Node]s. Each view belongs to exactly one
//! controller - a component which handles actions triggered by the view and updates its
//! [ViewState]. Views are materialized by a [ViewBinder], which is available for injection like
//! any other component:
//!
//! ```
//! use pos_desktop::controller::MainController;
//! use pos_desktop::view::{Parent, ViewBinder, ViewBinderExt, ViewLoadError};
//!
//! fn load_main_view(view_binder: &dyn ViewBinder) -> Result<Parent, ViewLoadError> {
//!     view_binder.load::<MainController>()
//! }
//! ```
//!
//! The default binder reads view resources from the directory configured as `app.views_dir` or,
//! when none is configured, from the views bundled with the application.

use crate::config::PosConfigProvider;
use derivative::Derivative;
use fxhash::{FxHashMap, FxHashSet};
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use springtime_di::component_registry::conditional::unregistered_component;
use springtime_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
use springtime_di::{component_alias, injectable, Component};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Resource name of the main view.
pub const MAIN_VIEW: &str = "main.json";

const BUNDLED_VIEWS: &[(&str, &str)] = &[(MAIN_VIEW, include_str!("../views/main.json"))];

/// Errors related to loading views.
#[derive(Error, Debug)]
pub enum ViewLoadError {
    #[error("Error retrieving configuration: {0}")]
    ConfigError(ErrorPtr),
    #[error("Cannot find a controller for view: {0}")]
    ControllerNotFound(String),
    #[error("Cannot find view resource: {0}")]
    ResourceNotFound(String),
    #[error("Error reading view resource {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error parsing view resource {resource}: {source}")]
    ParseError {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Action '{action}' used in {resource} is not handled by {controller}")]
    UnboundAction {
        resource: String,
        controller: String,
        action: String,
    },
    #[error("Duplicate node id '{id}' in {resource}")]
    DuplicateId { resource: String, id: String },
}

/// Errors raised by controllers while handling actions.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ControllerError {
    #[error("Unhandled action: {0}")]
    UnhandledAction(String),
}

/// Identifies a view along with the controller it is bound to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ViewDescriptor {
    /// Name of the controller handling the view.
    pub controller: &'static str,
    /// Resource containing the view document.
    pub resource: &'static str,
}

/// Types with a statically known view. Allows loading views by controller type.
pub trait BoundView {
    const VIEW: ViewDescriptor;
}

/// A single element of a view.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Node {
    #[serde(rename = "vbox")]
    VBox {
        #[serde(default)]
        spacing: f32,
        #[serde(default)]
        children: Vec<Node>,
    },
    #[serde(rename = "hbox")]
    HBox {
        #[serde(default)]
        spacing: f32,
        #[serde(default)]
        children: Vec<Node>,
    },
    Heading {
        text: String,
    },
    /// Static text, unless the [ViewState] contains a value for its id.
    Label {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        text: String,
    },
    /// Single-line input stored in the [ViewState] under its id.
    TextField {
        id: String,
        #[serde(default)]
        prompt: String,
    },
    /// Button triggering a controller action when clicked.
    Button {
        text: String,
        on_action: String,
    },
    Separator,
}

impl Node {
    /// Visits this node and all its descendants, depth-first.
    pub fn visit<'a>(&'a self, visitor: &mut impl FnMut(&'a Node)) {
        visitor(self);
        if let Node::VBox { children, .. } | Node::HBox { children, .. } = self {
            for child in children {
                child.visit(visitor);
            }
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            Node::Label { id, .. } => id.as_deref(),
            Node::TextField { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Parsed view resource.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ViewDocument {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub root: Node,
}

/// Mutable state of a materialized view, shared between the toolkit and the controller.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    values: FxHashMap<String, String>,
    close_requested: bool,
}

impl ViewState {
    pub fn value(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// Returns a mutable value for given id, creating an empty one if needed.
    pub fn value_mut(&mut self, id: &str) -> &mut String {
        self.values.entry(id.to_string()).or_default()
    }

    pub fn set_value<V: Into<String>>(&mut self, id: &str, value: V) {
        self.values.insert(id.to_string(), value.into());
    }

    /// Asks the toolkit to close the window displaying this view.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// Returns if closing was requested and resets the request.
    pub fn take_close_request(&mut self) -> bool {
        std::mem::take(&mut self.close_requested)
    }
}

/// Controllers handle actions triggered by their views.
#[injectable]
#[cfg_attr(test, automock)]
pub trait Controller {
    /// The view this controller is bound to.
    fn view(&self) -> ViewDescriptor;

    /// Checks if given action can be handled.
    fn handles(&self, action: &str) -> bool;

    fn handle(&self, action: &str, state: &mut ViewState) -> Result<(), ErrorPtr>;
}

/// Root of a materialized view: the node tree with its bound controller and state.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Parent {
    view: ViewDescriptor,
    document: ViewDocument,
    #[derivative(Debug = "ignore")]
    controller: ComponentInstancePtr<dyn Controller + Send + Sync>,
    state: ViewState,
}

impl Parent {
    pub fn new(
        view: ViewDescriptor,
        document: ViewDocument,
        controller: ComponentInstancePtr<dyn Controller + Send + Sync>,
    ) -> Self {
        Self {
            view,
            document,
            controller,
            state: Default::default(),
        }
    }

    pub fn view(&self) -> ViewDescriptor {
        self.view
    }

    pub fn root(&self) -> &Node {
        &self.document.root
    }

    /// Size declared by the view document, if both dimensions are present.
    pub fn preferred_size(&self) -> Option<(f32, f32)> {
        self.document.width.zip(self.document.height)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    /// Splits the view into its immutable tree and mutable state, for rendering.
    pub fn parts_mut(&mut self) -> (&Node, &mut ViewState) {
        (&self.document.root, &mut self.state)
    }

    /// Passes given action to the bound controller.
    pub fn fire(&mut self, action: &str) -> Result<(), ErrorPtr> {
        debug!(action, controller = self.view.controller, "Firing view action.");
        self.controller.handle(action, &mut self.state)
    }
}

/// Materializes views described by [ViewDescriptor]s.
#[injectable]
#[cfg_attr(test, automock)]
pub trait ViewBinder {
    fn load_view(&self, view: &ViewDescriptor) -> Result<Parent, ViewLoadError>;
}

/// Typed view loading for [ViewBinder]s.
pub trait ViewBinderExt {
    /// Loads the view bound to the given controller type.
    fn load<C: BoundView>(&self) -> Result<Parent, ViewLoadError>;
}

impl<T: ViewBinder + ?Sized> ViewBinderExt for T {
    #[inline]
    fn load<C: BoundView>(&self) -> Result<Parent, ViewLoadError> {
        self.load_view(&C::VIEW)
    }
}

#[derive(Component)]
#[component(priority = -128, condition = "unregistered_component::<dyn ViewBinder + Send + Sync>")]
struct FileViewBinder {
    controllers: Vec<ComponentInstancePtr<dyn Controller + Send + Sync>>,
    config_provider: ComponentInstancePtr<dyn PosConfigProvider + Send + Sync>,
}

#[component_alias]
impl ViewBinder for FileViewBinder {
    fn load_view(&self, view: &ViewDescriptor) -> Result<Parent, ViewLoadError> {
        let controller = self
            .controllers
            .iter()
            .find(|controller| controller.view().controller == view.controller)
            .cloned()
            .ok_or_else(|| ViewLoadError::ControllerNotFound(view.controller.to_string()))?;

        let config = self
            .config_provider
            .config()
            .map_err(ViewLoadError::ConfigError)?;

        debug!(
            resource = view.resource,
            controller = view.controller,
            "Loading view."
        );

        let source = read_resource(config.app.views_dir.as_deref(), view.resource)?;
        bind(view, &source, controller)
    }
}

fn read_resource(views_dir: Option<&Path>, resource: &str) -> Result<String, ViewLoadError> {
    match views_dir {
        Some(views_dir) => {
            let path = views_dir.join(resource);
            fs::read_to_string(&path).map_err(|error| {
                if error.kind() == ErrorKind::NotFound {
                    ViewLoadError::ResourceNotFound(path.display().to_string())
                } else {
                    ViewLoadError::ReadError {
                        path,
                        source: error,
                    }
                }
            })
        }
        None => BUNDLED_VIEWS
            .iter()
            .find(|(name, _)| *name == resource)
            .map(|(_, source)| source.to_string())
            .ok_or_else(|| ViewLoadError::ResourceNotFound(resource.to_string())),
    }
}

fn bind(
    view: &ViewDescriptor,
    source: &str,
    controller: ComponentInstancePtr<dyn Controller + Send + Sync>,
) -> Result<Parent, ViewLoadError> {
    let document: ViewDocument =
        serde_json::from_str(source).map_err(|error| ViewLoadError::ParseError {
            resource: view.resource.to_string(),
            source: error,
        })?;

    validate(view, &document.root, controller.as_ref())?;
    Ok(Parent::new(*view, document, controller))
}

// every id is unique and every action has a handler
fn validate(
    view: &ViewDescriptor,
    root: &Node,
    controller: &(dyn Controller + Send + Sync),
) -> Result<(), ViewLoadError> {
    let mut ids = FxHashSet::default();
    let mut result = Ok(());
    root.visit(&mut |node| {
        if result.is_err() {
            return;
        }

        if let Some(id) = node.id() {
            if !ids.insert(id) {
                result = Err(ViewLoadError::DuplicateId {
                    resource: view.resource.to_string(),
                    id: id.to_string(),
                });
            }
        }

        if let Node::Button { on_action, .. } = node {
            if !controller.handles(on_action) {
                result = Err(ViewLoadError::UnboundAction {
                    resource: view.resource.to_string(),
                    controller: view.controller.to_string(),
                    action: on_action.clone(),
                });
            }
        }
    });

    result
}
