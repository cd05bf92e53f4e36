//! The 8 concrete plugins that make up [`super::default_pipeline`] (§4.4).

mod address_maker;
mod init_shutdown;
mod lifetime;
mod link_client;
mod link_server;
mod registry;
mod resources;
mod starter;

pub use address_maker::AddressMakerPlugin;
pub use init_shutdown::InitShutdownPlugin;
pub use lifetime::LifetimePlugin;
pub use link_client::LinkClientPlugin;
pub use link_server::LinkServerPlugin;
pub use registry::RegistryPlugin;
pub use resources::{ResourceHandle, ResourcesPlugin};
pub use starter::StarterPlugin;
