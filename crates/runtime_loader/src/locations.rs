//! Where the runtime's resources live.
//!
//! The module, the classic script and the resource index all hang off one
//! versioned base so they can never disagree on the version.

use anyhow::{Context as _, Result, anyhow};
use url::Url;

/// Versioned base of the hosted runtime distribution.
pub const DEFAULT_RUNTIME_BASE: &str = "https://cdn.jsdelivr.net/pyodide/v0.25.1/full/";

const MODULE_FILE: &str = "pyodide.mjs";
const SCRIPT_FILE: &str = "pyodide.js";

/// Resolved resource locations for one runtime version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeLocations {
    index: Url,
    module: Url,
    script: Url,
}

impl RuntimeLocations {
    /// Derive all locations from `base`. A missing trailing slash is added so
    /// the last path segment is kept.
    ///
    /// # Errors
    /// Fails for URLs that cannot act as a base (for example `data:` URLs).
    pub fn new(mut base: Url) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(anyhow!("Runtime base {base} cannot hold relative resources"));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let module = base.join(MODULE_FILE)?;
        let script = base.join(SCRIPT_FILE)?;
        Ok(Self {
            index: base,
            module,
            script,
        })
    }

    /// Parse and derive from a base URL string.
    ///
    /// # Errors
    /// Fails if `base` is not a valid base URL.
    pub fn parse(base: &str) -> Result<Self> {
        let url = Url::parse(base).with_context(|| format!("Invalid runtime base URL {base}"))?;
        Self::new(url)
    }

    /// The hosted default distribution.
    ///
    /// # Errors
    /// Never fails in practice; the default base is a valid URL.
    pub fn hosted() -> Result<Self> {
        Self::parse(DEFAULT_RUNTIME_BASE)
    }

    /// Resource index handed to the runtime factory.
    #[inline]
    pub fn index_url(&self) -> &Url {
        &self.index
    }

    /// ES module exporting the factory.
    #[inline]
    pub fn module_url(&self) -> &Url {
        &self.module
    }

    /// Classic script installing the factory as a global.
    #[inline]
    pub fn script_url(&self) -> &Url {
        &self.script
    }
}
