pub mod registry;
pub mod window;

pub use registry::WindowRegistry;
pub use window::{WindowId, WindowState, WindowSummary};
