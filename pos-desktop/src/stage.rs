//! Window-level abstractions exposed by the GUI toolkit. A [Stage] is a top-level window, which
//! displays a single [Scene] at a time, while [Platform] gives access to process-wide toolkit
//! operations.

use crate::view::Parent;
use derive_more::Constructor;
#[cfg(test)]
use mockall::automock;

/// Container for the root of a loaded view, installed into a [Stage]. The scene has no explicit
/// dimensions - the toolkit computes them from the root, optionally using the preferred size
/// declared by the view.
#[derive(Constructor, Debug)]
pub struct Scene {
    root: Parent,
}

impl Scene {
    pub fn root(&self) -> &Parent {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Parent {
        &mut self.root
    }
}

/// A top-level window created and owned by the toolkit. The application only borrows it while
/// reacting to a [StageReadyEvent](crate::event::StageReadyEvent).
#[cfg_attr(test, automock)]
pub trait Stage {
    /// Replaces the content of this window.
    fn set_scene(&mut self, scene: Scene);

    fn set_title(&mut self, title: &str);

    /// Makes the window visible.
    fn show(&mut self);
}

/// Process-wide toolkit operations.
#[cfg_attr(test, automock)]
pub trait Platform {
    /// Asks the toolkit to terminate its event loop, which ends the process.
    fn exit(&self);
}
