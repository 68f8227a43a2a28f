//! Bootstrap of the point-of-sale desktop application, based on [springtime_di] dependency
//! injection and the [eframe] GUI toolkit.
//!
//! The toolkit drives the application through a [Lifecycle](application::Lifecycle): the
//! [application context](context::ApplicationContext) is built before any window exists, the
//! primary window is handed to [stage listeners](event::StageReadyListener) once available, and
//! the context is closed when the toolkit shuts down. The default
//! [PrimaryStageListener](listener::PrimaryStageListener) fills the window with the main
//! [view](view), bound to its [controller](controller::MainController).
//!
//! ```no_run
//! use pos_desktop::{application, toolkit};
//!
//! toolkit::launch(application::create_default(), std::env::args().skip(1).collect())
//!     .expect("error running application");
//! ```

pub mod application;
pub mod config;
pub mod context;
pub mod controller;
pub mod event;
pub mod listener;
pub mod stage;
pub mod toolkit;
pub mod view;
