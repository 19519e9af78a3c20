//! Plugin bundles for stepwise: manifest validation, installation, and
//! invocation of installed code units.

pub mod installer;
pub mod invoker;
pub mod loader;
pub mod manifest;
pub mod module;
pub mod registry;

pub use invoker::PluginInvoker;
pub use manifest::{PluginManifest, PluginSummary, PluginType, Permissions};
pub use module::{Invocation, ModuleLoader, PluginModule, ProcessLoader};
pub use registry::PluginRegistry;
