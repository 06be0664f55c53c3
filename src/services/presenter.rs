//! Error presentation capability.
//!
//! Reported errors are shown to the user through an [`ErrorPresenter`] before
//! being logged. The production presenter is a native modal dialog that blocks
//! the calling thread until acknowledged; tests inject a recording double.

use rfd::{MessageButtons, MessageDialog, MessageLevel};

/// Caption used for reported errors
pub const ERROR_CAPTION: &str = "Error";

/// Shows a formatted error to the user, blocking until it is acknowledged.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorPresenter: Send + Sync {
    fn present(&self, caption: &str, message: &str);
}

/// Native blocking "OK" dialog
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogErrorPresenter;

impl ErrorPresenter for DialogErrorPresenter {
    fn present(&self, caption: &str, message: &str) {
        MessageDialog::new()
            .set_title(caption)
            .set_description(message)
            .set_level(MessageLevel::Error)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

/// Presenter for headless runs: the error goes to the internal log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyErrorPresenter;

impl ErrorPresenter for LogOnlyErrorPresenter {
    fn present(&self, caption: &str, message: &str) {
        tracing::error!("{}: {}", caption, message);
    }
}

/// Presenter matching the configuration's `show_error_dialogs` flag
pub fn presenter_for(show_error_dialogs: bool) -> Box<dyn ErrorPresenter> {
    if show_error_dialogs {
        Box::new(DialogErrorPresenter)
    } else {
        Box::new(LogOnlyErrorPresenter)
    }
}
