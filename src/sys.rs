pub mod event;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod screen;
pub mod timer;
