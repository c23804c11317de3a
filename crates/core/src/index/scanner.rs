//! Package discovery.
//!
//! A package is one directory of `.go` files. The walk skips hidden entries,
//! `_`-prefixed and `testdata` directories, and nested modules (a
//! subdirectory carrying its own `go.mod`). Packages under `vendor/` are
//! discovered too, but flagged as dependencies: they feed the type scopes
//! used by satisfaction checks without entering the symbol table.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

#[derive(Debug, Clone)]
pub(crate) struct DiscoveredPackage {
    pub import_path: String,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub is_dependency: bool,
}

/// Reads the module path from the root `go.mod`, if present.
pub(crate) fn module_path(root: &Path) -> Option<String> {
    let text = fs::read_to_string(root.join("go.mod")).ok()?;
    text.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some("module"), Some(path)) => Some(path.trim_matches('"').to_string()),
            _ => None,
        }
    })
}

/// Walks the root and groups Go source files into per-directory packages.
pub(crate) fn discover(root: &Path, module: &str) -> Vec<DiscoveredPackage> {
    let root_owned = root.to_path_buf();
    let walker = WalkBuilder::new(root)
        .follow_links(false)
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let path = entry.path();
            if !path.is_dir() {
                return true;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('_') || name == "testdata" {
                    return false;
                }
            }
            // A nested go.mod starts a different module; its packages are
            // not reachable from this root's build.
            if path != root_owned && path.join("go.mod").exists() {
                return false;
            }
            true
        })
        .build();

    let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".go") || name.ends_with("_test.go") {
            continue;
        }
        let Some(dir) = path.parent() else { continue };
        by_dir
            .entry(dir.to_path_buf())
            .or_default()
            .push(path.to_path_buf());
    }

    let vendor_root = root.join("vendor");
    let mut packages = Vec::new();
    for (dir, mut files) in by_dir {
        files.sort();
        let (import_path, is_dependency) = match dir.strip_prefix(&vendor_root) {
            Ok(rel) => {
                let rel = unix_path(rel);
                if rel.is_empty() {
                    // Loose files directly in vendor/ do not form a package.
                    continue;
                }
                (rel, true)
            }
            Err(_) => {
                let rel = dir
                    .strip_prefix(root)
                    .map(unix_path)
                    .unwrap_or_default();
                let import_path = if rel.is_empty() {
                    module.to_string()
                } else {
                    format!("{module}/{rel}")
                };
                (import_path, false)
            }
        };
        packages.push(DiscoveredPackage {
            import_path,
            dir,
            files,
            is_dependency,
        });
    }
    packages
}

fn unix_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
