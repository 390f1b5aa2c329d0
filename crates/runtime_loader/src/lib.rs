//! On-demand acquisition of the secondary (Python) runtime.
//!
//! The runtime is an engine loaded from a remote, versioned location and
//! instantiated through a factory that the host realm exposes. Acquisition is
//! tried through an ordered list of [`AcquireStrategy`] values: the module
//! strategy first, then the classic-script global as fallback. The
//! [`RuntimeLoader`] makes sure at most one runtime exists per session and that
//! concurrent callers share a single in-flight attempt.

pub mod fetch;
pub mod host;
pub mod loader;
pub mod locations;
pub mod redirect;
pub mod source;
pub mod strategy;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use fetch::{HttpFetcher, ResourceFetcher};
pub use host::{RuntimeConfig, RuntimeFactory, RuntimeHandle, ScriptHost, SecondaryRuntime};
pub use loader::{AcquireError, RuntimeLoader, RuntimeStatus, SELF_TEST_SOURCE};
pub use locations::{DEFAULT_RUNTIME_BASE, RuntimeLocations};
pub use redirect::{install_stdio_redirect, stdio_redirect_prelude};
pub use source::{PLACEHOLDER_SOURCE, select_source};
pub use strategy::{
    AcquireStrategy, GLOBAL_FACTORY, ModuleStrategy, ScriptGlobalStrategy, StrategyContext,
    default_strategies,
};
