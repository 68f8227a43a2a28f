//! Controllers of the application views.

use crate::view::{BoundView, Controller, ControllerError, ViewDescriptor, ViewState, MAIN_VIEW};
use springtime_di::instance_provider::ErrorPtr;
use springtime_di::{component_alias, Component};
use std::sync::Arc;
use tracing::info;

const ADD_ITEM: &str = "add-item";
const CLEAR: &str = "clear";
const EXIT: &str = "exit";

const BARCODE_FIELD: &str = "barcode";
const STATUS_LABEL: &str = "status";

/// Controller of the main register view.
#[derive(Component)]
pub struct MainController;

impl BoundView for MainController {
    const VIEW: ViewDescriptor = ViewDescriptor {
        controller: "MainController",
        resource: MAIN_VIEW,
    };
}

#[component_alias]
impl Controller for MainController {
    fn view(&self) -> ViewDescriptor {
        Self::VIEW
    }

    fn handles(&self, action: &str) -> bool {
        matches!(action, ADD_ITEM | CLEAR | EXIT)
    }

    fn handle(&self, action: &str, state: &mut ViewState) -> Result<(), ErrorPtr> {
        match action {
            ADD_ITEM => {
                let barcode = state
                    .value(BARCODE_FIELD)
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string();

                if barcode.is_empty() {
                    state.set_value(STATUS_LABEL, "Enter a barcode first.");
                } else {
                    info!(barcode = %barcode, "Item scanned.");
                    state.set_value(STATUS_LABEL, format!("Scanned {barcode}."));
                    state.set_value(BARCODE_FIELD, "");
                }
            }
            CLEAR => {
                state.set_value(BARCODE_FIELD, "");
                state.set_value(STATUS_LABEL, "Ready.");
            }
            EXIT => state.request_close(),
            _ => {
                return Err(
                    Arc::new(ControllerError::UnhandledAction(action.to_string())) as ErrorPtr,
                )
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::controller::MainController;
    use crate::view::{Controller, ControllerError, ViewState};

    #[test]
    fn should_handle_declared_actions() {
        let controller = MainController;

        assert!(controller.handles("add-item"));
        assert!(controller.handles("clear"));
        assert!(controller.handles("exit"));
        assert!(!controller.handles("refund"));
    }

    #[test]
    fn should_scan_barcode() {
        let mut state = ViewState::default();
        state.set_value("barcode", " 590123412345 ");

        MainController.handle("add-item", &mut state).unwrap();

        assert_eq!(state.value("status"), Some("Scanned 590123412345."));
        assert_eq!(state.value("barcode"), Some(""));
    }

    #[test]
    fn should_require_barcode() {
        let mut state = ViewState::default();

        MainController.handle("add-item", &mut state).unwrap();

        assert_eq!(state.value("status"), Some("Enter a barcode first."));
    }

    #[test]
    fn should_clear_view() {
        let mut state = ViewState::default();
        state.set_value("barcode", "123");
        state.set_value("status", "Scanned 123.");

        MainController.handle("clear", &mut state).unwrap();

        assert_eq!(state.value("barcode"), Some(""));
        assert_eq!(state.value("status"), Some("Ready."));
    }

    #[test]
    fn should_request_close_on_exit() {
        let mut state = ViewState::default();

        MainController.handle("exit", &mut state).unwrap();

        assert!(state.take_close_request());
    }

    #[test]
    fn should_reject_unknown_action() {
        let mut state = ViewState::default();

        let error = MainController.handle("refund", &mut state).unwrap_err();
        assert_eq!(
            error.downcast_ref::<ControllerError>(),
            Some(&ControllerError::UnhandledAction("refund".to_string()))
        );
    }
}
