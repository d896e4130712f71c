//! Configuration loading: registry documents and user settings.
pub mod registry;
pub mod settings;
pub mod toml_loader;

pub use registry::{ConfigEntry, Registry, RegistryStore, Strategy};
pub use settings::Settings;
