pub mod command;
pub mod display;
pub mod drag;
pub mod hover;
pub mod window;
