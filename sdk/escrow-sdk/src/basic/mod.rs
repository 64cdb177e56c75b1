pub mod actions;
pub mod app;
pub mod registry;
pub mod session;
