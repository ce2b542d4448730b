//! Filesystem route discovery.
//!
//! Every file under the routes directory with the module extension becomes
//! one route. Its URL comes from its relative path:
//!
//! | File | URL |
//! |---|---|
//! | `index.json` | `/api` |
//! | `accounts/index.json` | `/api/accounts` |
//! | `accounts/id.json` | `/api/accounts/:id` |
//! | `accounts/export.json` | `/api/accounts/export` |
//!
//! Only the exact segment `index` collapses and only the exact segment `id`
//! becomes a parameter. There is no other parameter syntax.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::Error;
use crate::module::{LoadedRoute, RouteModule};

/// Every derived URL starts here.
pub const API_ROOT: &str = "/api";

/// Extension of route module files.
pub const MODULE_EXTENSION: &str = "json";

/// Turns one route file into a [`RouteModule`].
///
/// Loading happens once per file at startup. An error aborts discovery.
pub trait ModuleLoader {
    fn load(&self, path: &Path) -> Result<RouteModule, Error>;
}

/// Derives the URL pattern for `file`, which must live under `root`.
pub fn url_for(root: &Path, file: &Path) -> Result<String, Error> {
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");

    let mut segments = Vec::new();
    for component in relative.components() {
        let Component::Normal(segment) = component else { continue };
        let segment = segment
            .to_str()
            .ok_or_else(|| Error::NonUtf8Path { path: file.to_path_buf() })?;
        match segment {
            "index" => {}
            "id" => segments.push(":id"),
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        Ok(API_ROOT.to_owned())
    } else {
        Ok(format!("{API_ROOT}/{}", segments.join("/")))
    }
}

/// Recursively collects module files under `dir`, in file-name order.
fn walk(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<(), Error> {
    let read_err = |source| Error::ReadDir { path: dir.to_path_buf(), source };

    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(read_err)?;
        if file_type.is_dir() {
            walk(&path, acc)?;
        } else if file_type.is_file()
            && path.extension().is_some_and(|ext| ext == MODULE_EXTENSION)
        {
            acc.push(path);
        }
    }
    Ok(())
}

/// Discovers and loads every route module under `root`.
///
/// Fails on the first unreadable directory or module; there is no partial
/// result.
pub fn discover(root: &Path, loader: &impl ModuleLoader) -> Result<Vec<LoadedRoute>, Error> {
    let mut files = Vec::new();
    walk(root, &mut files)?;

    let mut routes = Vec::with_capacity(files.len());
    for file_path in files {
        let url = url_for(root, &file_path)?;
        let module = loader.load(&file_path)?;
        debug!(url = %url, file = %file_path.display(), "route module loaded");
        routes.push(LoadedRoute { url, file_path, module });
    }
    Ok(routes)
}
