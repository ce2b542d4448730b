//! JSON route manifests.
//!
//! A manifest is the on-disk form of a route module. It names compiled-in
//! handlers instead of containing code:
//!
//! ```json
//! {
//!   "meta": { "auth": "required", "roles": ["admin"] },
//!   "handlers": { "GET": "profile.show", "PUT": "profile.update" }
//! }
//! ```
//!
//! [`ManifestLoader`] parses the file and resolves every handler name
//! against its [`Handlers`] registry. Malformed JSON, an unknown key, a
//! method other than GET/POST/PUT/PATCH/DELETE or an unregistered handler
//! name all fail the load.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::discovery::ModuleLoader;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::module::{RouteMeta, RouteModule};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    meta: RouteMeta,
    #[serde(default)]
    handlers: BTreeMap<Method, String>,
}

/// Named handlers that manifests may refer to.
#[derive(Clone, Default)]
pub struct Handlers {
    by_name: HashMap<String, BoxedHandler>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any previous entry.
    pub fn register(mut self, name: impl Into<String>, handler: impl Handler) -> Self {
        self.by_name.insert(name.into(), handler.into_boxed_handler());
        self
    }

    fn get(&self, name: &str) -> Option<&BoxedHandler> {
        self.by_name.get(name)
    }
}

/// Loads `*.json` route manifests.
#[derive(Clone, Default)]
pub struct ManifestLoader {
    handlers: Handlers,
}

impl ManifestLoader {
    pub fn new(handlers: Handlers) -> Self {
        Self { handlers }
    }
}

impl ModuleLoader for ManifestLoader {
    fn load(&self, path: &Path) -> Result<RouteModule, Error> {
        let raw = fs::read_to_string(path)
            .map_err(|source| Error::ReadModule { path: path.to_path_buf(), source })?;
        let manifest: Manifest = serde_json::from_str(&raw)
            .map_err(|source| Error::InvalidModule { path: path.to_path_buf(), source })?;

        let mut module = RouteModule::new().meta(manifest.meta);
        for (method, name) in manifest.handlers {
            let handler = self.handlers.get(&name).ok_or_else(|| Error::UnknownHandler {
                path: path.to_path_buf(),
                method,
                name: name.clone(),
            })?;
            module = module.on_boxed(method, handler.clone());
        }
        Ok(module)
    }
}
