//! Codebase loader.
//!
//! `Indexer::index` runs the full build: discover packages, parse every file,
//! resolve type scopes, compute method sets, and assemble the immutable
//! [`Snapshot`] the query layer reads. A package that fails to load is
//! skipped with a diagnostic, never fatal; only a bad root aborts the build.

pub(crate) mod format;
pub(crate) mod parser;
pub(crate) mod resolve;
pub(crate) mod scanner;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::GolensError;
use crate::model::{FuncInfo, PackageInfo, TypeInfo, TypeKind};
use crate::Result;

use self::parser::{GoParser, ParsedFile};
use self::resolve::{MethodRecord, MethodSets, PackageScope, TypeEntry};
use self::scanner::DiscoveredPackage;

/// Builds symbol indexes for a single codebase root.
pub struct Indexer {
    root: PathBuf,
}

/// One fully built, immutable index. Rebuilding produces a brand-new
/// snapshot; existing snapshots are never mutated, so any number of readers
/// may query one concurrently while a replacement is under construction.
pub struct Snapshot {
    root: PathBuf,
    packages: BTreeMap<String, PackageInfo>,
    scopes: BTreeMap<String, PackageScope>,
    diagnostics: Vec<String>,
}

impl Snapshot {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Indexed packages keyed by import path. Only packages physically under
    /// the root (and outside `vendor/`) appear here.
    pub fn packages(&self) -> &BTreeMap<String, PackageInfo> {
        &self.packages
    }

    /// Non-fatal problems encountered during the build, one line each.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Resolved type scopes for every loaded package, dependencies included.
    pub(crate) fn scopes(&self) -> &BTreeMap<String, PackageScope> {
        &self.scopes
    }
}

struct ParsedPackage {
    import_path: String,
    name: String,
    dir: PathBuf,
    is_dependency: bool,
    files: Vec<(PathBuf, ParsedFile)>,
}

impl Indexer {
    /// Creates an indexer rooted at `root`. Fails up front when the path is
    /// not an existing directory; no loading happens before [`Self::index`].
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let display = root.display().to_string();
        let meta = fs::metadata(root).map_err(|_| GolensError::InvalidRoot(display.clone()))?;
        if !meta.is_dir() {
            return Err(GolensError::InvalidRoot(display));
        }
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads and scans the whole codebase, returning a fresh snapshot.
    pub fn index(&self) -> Result<Snapshot> {
        info!(root = %self.root.display(), "indexing codebase");
        let mut diagnostics = Vec::new();

        let module = match scanner::module_path(&self.root) {
            Some(module) => module,
            None => {
                let fallback = self
                    .root
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "main".to_string());
                let note = format!(
                    "no go.mod under {}; using {fallback:?} as the module path",
                    self.root.display()
                );
                warn!("{note}");
                diagnostics.push(note);
                fallback
            }
        };

        let discovered = scanner::discover(&self.root, &module);
        let results: Vec<(Option<ParsedPackage>, Vec<String>)> = discovered
            .into_par_iter()
            .map(parse_package)
            .collect();

        let mut parsed = Vec::new();
        for (pkg, mut diags) in results {
            diagnostics.append(&mut diags);
            if let Some(pkg) = pkg {
                parsed.push(pkg);
            }
        }

        let scopes = build_scopes(&parsed);
        let packages = build_packages(&parsed, &scopes);

        info!(
            packages = packages.len(),
            scopes = scopes.len(),
            warnings = diagnostics.len(),
            "index ready"
        );

        Ok(Snapshot {
            root: self.root.clone(),
            packages,
            scopes,
            diagnostics,
        })
    }
}

fn parse_package(disc: DiscoveredPackage) -> (Option<ParsedPackage>, Vec<String>) {
    let mut diags = Vec::new();
    let mut parser = match GoParser::new() {
        Ok(parser) => parser,
        Err(e) => {
            diags.push(format!("initializing parser: {e}"));
            return (None, diags);
        }
    };

    let mut files = Vec::new();
    let mut package_name = String::new();
    for path in &disc.files {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                let note = format!("skipping package {}: reading {}: {e}", disc.import_path, path.display());
                warn!("{note}");
                diags.push(note);
                return (None, diags);
            }
        };
        let file = match parser.parse_file(&disc.import_path, path, &source) {
            Ok(file) => file,
            Err(e) => {
                let note = format!("skipping package {}: {e}", disc.import_path);
                warn!("{note}");
                diags.push(note);
                return (None, diags);
            }
        };
        if file.package_name.is_empty() {
            let note = format!(
                "skipping package {}: {} has no package clause",
                disc.import_path,
                path.display()
            );
            warn!("{note}");
            diags.push(note);
            return (None, diags);
        }
        if package_name.is_empty() {
            package_name = file.package_name.clone();
        } else if package_name != file.package_name {
            let note = format!(
                "skipping package {}: mixed package clauses {:?} and {:?}",
                disc.import_path, package_name, file.package_name
            );
            warn!("{note}");
            diags.push(note);
            return (None, diags);
        }
        files.push((path.clone(), file));
    }

    if files.is_empty() {
        return (None, diags);
    }

    (
        Some(ParsedPackage {
            import_path: disc.import_path,
            name: package_name,
            dir: disc.dir,
            is_dependency: disc.is_dependency,
            files,
        }),
        diags,
    )
}

/// Builds the resolved type scope of every parsed package.
fn build_scopes(parsed: &[ParsedPackage]) -> BTreeMap<String, PackageScope> {
    let mut scopes = BTreeMap::new();
    for pkg in parsed {
        let mut scope = PackageScope {
            import_path: pkg.import_path.clone(),
            name: pkg.name.clone(),
            types: BTreeMap::new(),
            funcs: Default::default(),
            vars: Default::default(),
        };

        for (_, file) in &pkg.files {
            for raw in &file.types {
                let mut entry = TypeEntry::new(raw.kind);
                entry.embeds = raw.embeds.clone();
                entry.iface_embeds = raw.iface_embeds.clone();
                entry.alias_target = raw.alias_target.clone();
                if raw.kind == TypeKind::Interface {
                    // Declared interface methods double as value-receiver
                    // records so a struct embedding the interface promotes
                    // them like any other method.
                    entry.methods = raw.iface_methods.clone();
                    entry.iface_methods = raw
                        .iface_methods
                        .iter()
                        .map(|m| (m.name.clone(), m.sig.clone()))
                        .collect();
                }
                if scope.types.insert(raw.name.clone(), entry).is_some() {
                    warn!(
                        package = %pkg.import_path,
                        name = %raw.name,
                        "duplicate type declaration; keeping the last one"
                    );
                }
            }
            for func in &file.funcs {
                if func.receiver.is_none() {
                    scope.funcs.insert(func.info.name.clone());
                }
            }
            for value in &file.values {
                scope.vars.insert(value.name.clone());
            }
        }

        for (_, file) in &pkg.files {
            for func in &file.funcs {
                let Some(recv) = &func.receiver else { continue };
                if recv.base.is_empty() {
                    continue;
                }
                let entry = scope
                    .types
                    .entry(recv.base.clone())
                    .or_insert_with(|| TypeEntry::new(TypeKind::Other));
                entry.methods.push(MethodRecord {
                    name: func.info.name.clone(),
                    pointer_recv: recv.pointer,
                    sig: func.sig.clone(),
                    info: func.info.clone(),
                });
            }
        }

        for entry in scope.types.values_mut() {
            entry.methods.sort_by(|a, b| a.name.cmp(&b.name));
        }

        scopes.insert(pkg.import_path.clone(), scope);
    }
    scopes
}

/// Assembles the symbol table for every package rooted in the target tree.
fn build_packages(
    parsed: &[ParsedPackage],
    scopes: &BTreeMap<String, PackageScope>,
) -> BTreeMap<String, PackageInfo> {
    let mut packages = BTreeMap::new();
    for pkg in parsed {
        if pkg.is_dependency {
            continue;
        }

        let mut funcs: Vec<FuncInfo> = pkg
            .files
            .iter()
            .flat_map(|(_, f)| &f.funcs)
            .filter(|f| f.receiver.is_none())
            .map(|f| f.info.clone())
            .collect();
        funcs.sort_by(|a, b| a.name.cmp(&b.name));

        let mut vars: Vec<_> = pkg
            .files
            .iter()
            .flat_map(|(_, f)| f.values.clone())
            .collect();
        vars.sort_by(|a, b| a.name.cmp(&b.name));

        let mut types: Vec<TypeInfo> = Vec::new();
        for (_, file) in &pkg.files {
            for raw in &file.types {
                let (methods, embeds) = match raw.kind {
                    TypeKind::Interface => {
                        let mut methods: Vec<FuncInfo> =
                            raw.iface_methods.iter().map(|m| m.info.clone()).collect();
                        methods.sort_by(|a, b| a.name.cmp(&b.name));
                        let embeds = raw.iface_embeds.iter().map(|e| e.display.clone()).collect();
                        (methods, embeds)
                    }
                    TypeKind::Struct | TypeKind::Other => {
                        let sets = resolve::method_sets(scopes, &pkg.import_path, &raw.name);
                        let embeds = raw.embeds.iter().map(|e| e.display.clone()).collect();
                        (materialize_methods(&sets, &pkg.import_path), embeds)
                    }
                    TypeKind::Alias => (Vec::new(), Vec::new()),
                };
                types.push(TypeInfo {
                    name: raw.name.clone(),
                    package: pkg.import_path.clone(),
                    kind: raw.kind,
                    fields: raw.fields.clone(),
                    methods,
                    embeds,
                    doc: raw.doc.clone(),
                    location: raw.location.clone(),
                });
            }
        }
        types.sort_by(|a, b| a.name.cmp(&b.name));

        let mut files: Vec<String> = pkg
            .files
            .iter()
            .map(|(path, _)| path.to_string_lossy().to_string())
            .collect();
        files.sort();

        packages.insert(
            pkg.import_path.clone(),
            PackageInfo {
                import_path: pkg.import_path.clone(),
                name: pkg.name.clone(),
                dir: pkg.dir.to_string_lossy().to_string(),
                files,
                funcs,
                types,
                vars,
            },
        );
    }
    packages
}

/// Flattens the pointer-form method set into the per-type method list:
/// deterministic name order, promotion marked by embedding depth.
fn materialize_methods(sets: &MethodSets, import_path: &str) -> Vec<FuncInfo> {
    sets.pointer
        .values()
        .map(|(depth, record)| {
            let mut info = record.info.clone();
            info.package = import_path.to_string();
            info.is_promoted = *depth > 0;
            info
        })
        .collect()
}
