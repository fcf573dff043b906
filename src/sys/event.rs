use serde::{Deserialize, Serialize};

/// State of the primary pointer button when a window-move event was observed.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum MouseState {
    Up = 1,
    Down = 2,
}

impl MouseState {
    pub fn is_down(self) -> bool { self == MouseState::Down }
}
