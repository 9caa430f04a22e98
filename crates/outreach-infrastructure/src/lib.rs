//! Infrastructure layer: transport, request correlation and settings
//! persistence for the Outreach core.

pub mod broker;
pub mod channel;
pub mod paths;
pub mod settings_store;

pub use broker::RequestBroker;
pub use channel::InMemoryChannel;
pub use settings_store::{SettingsFile, SettingsStore};
