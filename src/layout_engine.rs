pub mod dock;
pub mod frames;
pub mod reorganize;

pub use dock::{DockResolver, NotchTarget};
pub use reorganize::{ReorganizedLayout, reorganize};
