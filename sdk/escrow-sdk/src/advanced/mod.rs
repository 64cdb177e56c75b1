pub mod lifetime;
pub mod watcher;
