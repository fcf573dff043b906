use thiserror::Error;

use crate::model::window::WindowId;
use crate::sys::screen::DisplayId;

#[derive(Debug, Error, PartialEq)]
pub enum ReactorError {
    #[error("Window not found: {0:?}")]
    WindowNotFound(WindowId),
    #[error("No displays are known")]
    NoDisplays,
    #[error("Window {0:?} is mid-transition")]
    TransitionInFlight(WindowId),
    #[error("Display {0} has no notch target")]
    NoNotchTarget(DisplayId),
}
