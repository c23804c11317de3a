//! Read-only queries over a built snapshot.
//!
//! `Finder` borrows an immutable [`Snapshot`] and never mutates it, so any
//! number of callers may query concurrently without locking. Lookups for a
//! specific named entity fail with a typed error naming both the identifier
//! and the lookup step that missed; bulk searches return empty results
//! instead.

mod satisfy;

use std::path::Path;
use std::str::FromStr;

use crate::error::GolensError;
use crate::index::Snapshot;
use crate::model::{
    self, FuncInfo, Implementation, PackageSummary, PackageSymbols, SymbolKind, SymbolRef,
    TypeInfo, VarInfo,
};
use crate::Result;

/// How symbol names are compared in [`Finder::find_symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Exact,
    Prefix,
    Contains,
}

impl FromStr for MatchMode {
    type Err = GolensError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(MatchMode::Exact),
            "prefix" => Ok(MatchMode::Prefix),
            "contains" => Ok(MatchMode::Contains),
            other => Err(GolensError::InvalidMatchMode(other.to_string())),
        }
    }
}

fn matches_query(symbol_name: &str, query: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => symbol_name == query,
        MatchMode::Prefix => symbol_name.starts_with(query),
        MatchMode::Contains => symbol_name.contains(query),
    }
}

/// Queries an index snapshot for symbols and type relationships.
pub struct Finder<'a> {
    snap: &'a Snapshot,
}

impl<'a> Finder<'a> {
    pub fn new(snap: &'a Snapshot) -> Self {
        Self { snap }
    }

    /// Lists indexed packages, optionally filtered by import-path prefix.
    pub fn list_packages(&self, prefix: Option<&str>) -> Vec<PackageSummary> {
        self.snap
            .packages()
            .values()
            .filter(|p| prefix.is_none_or(|pre| p.import_path.starts_with(pre)))
            .map(|p| PackageSummary {
                import_path: p.import_path.clone(),
                name: p.name.clone(),
                dir: p.dir.clone(),
                file_count: p.files.len(),
                func_count: p.funcs.len(),
                type_count: p.types.len(),
            })
            .collect()
    }

    /// All symbols of one package, optionally including unexported ones.
    pub fn package_symbols(
        &self,
        import_path: &str,
        include_unexported: bool,
    ) -> Result<PackageSymbols> {
        let pkg = self
            .snap
            .packages()
            .get(import_path)
            .ok_or_else(|| GolensError::PackageNotFound(import_path.to_string()))?;
        Ok(PackageSymbols {
            funcs: filter_funcs(pkg.funcs.clone(), include_unexported),
            types: filter_types(pkg.types.clone(), include_unexported),
            vars: filter_vars(pkg.vars.clone(), include_unexported),
        })
    }

    /// All symbols declared in one file, across every indexed package. An
    /// absolute query must match exactly; a relative one matches by path
    /// suffix. No match yields empty result sets, not an error.
    pub fn file_symbols(&self, file: &str, include_unexported: bool) -> PackageSymbols {
        let is_abs = Path::new(file).is_absolute();
        let mut result = PackageSymbols::default();
        for pkg in self.snap.packages().values() {
            for func in &pkg.funcs {
                if file_matches(&func.location.file, file, is_abs) {
                    result.funcs.push(func.clone());
                }
            }
            for ty in &pkg.types {
                if file_matches(&ty.location.file, file, is_abs) {
                    result.types.push(ty.clone());
                }
            }
            for var in &pkg.vars {
                if file_matches(&var.location.file, file, is_abs) {
                    result.vars.push(var.clone());
                }
            }
        }
        PackageSymbols {
            funcs: filter_funcs(result.funcs, include_unexported),
            types: filter_types(result.types, include_unexported),
            vars: filter_vars(result.vars, include_unexported),
        }
    }

    /// Searches for symbols matching `name` across all indexed packages:
    /// package-level functions, named types plus each of their methods, and
    /// variables/constants.
    pub fn find_symbol(
        &self,
        name: &str,
        kind: Option<SymbolKind>,
        mode: MatchMode,
    ) -> Vec<SymbolRef> {
        let mut refs = Vec::new();
        for pkg in self.snap.packages().values() {
            for func in &pkg.funcs {
                if matches_query(&func.name, name, mode) {
                    refs.push(SymbolRef {
                        name: func.name.clone(),
                        package: pkg.import_path.clone(),
                        kind: SymbolKind::Func,
                        receiver: String::new(),
                        signature: func.signature.clone(),
                        location: func.location.clone(),
                    });
                }
            }
            for ty in &pkg.types {
                if matches_query(&ty.name, name, mode) {
                    refs.push(SymbolRef {
                        name: ty.name.clone(),
                        package: pkg.import_path.clone(),
                        kind: SymbolKind::Type,
                        receiver: String::new(),
                        signature: String::new(),
                        location: ty.location.clone(),
                    });
                }
                for method in &ty.methods {
                    if matches_query(&method.name, name, mode) {
                        refs.push(SymbolRef {
                            name: method.name.clone(),
                            package: pkg.import_path.clone(),
                            kind: SymbolKind::Method,
                            receiver: method.receiver.clone(),
                            signature: method.signature.clone(),
                            location: method.location.clone(),
                        });
                    }
                }
            }
            for var in &pkg.vars {
                if matches_query(&var.name, name, mode) {
                    refs.push(SymbolRef {
                        name: var.name.clone(),
                        package: pkg.import_path.clone(),
                        kind: if var.is_const {
                            SymbolKind::Const
                        } else {
                            SymbolKind::Var
                        },
                        receiver: String::new(),
                        signature: String::new(),
                        location: var.location.clone(),
                    });
                }
            }
        }
        match kind {
            Some(kind) => refs.into_iter().filter(|r| r.kind == kind).collect(),
            None => refs,
        }
    }

    /// Looks up a package-level function, or a method when `name` has the
    /// `TypeName.MethodName` form. Promoted methods resolve too.
    pub fn function(&self, import_path: &str, name: &str) -> Result<FuncInfo> {
        let pkg = self
            .snap
            .packages()
            .get(import_path)
            .ok_or_else(|| GolensError::PackageNotFound(import_path.to_string()))?;

        if let Some((type_name, method_name)) = name.split_once('.') {
            let ty = pkg
                .types
                .iter()
                .find(|t| t.name == type_name)
                .ok_or_else(|| GolensError::TypeNotFound {
                    package: import_path.to_string(),
                    name: type_name.to_string(),
                })?;
            return ty
                .methods
                .iter()
                .find(|m| m.name == method_name)
                .cloned()
                .ok_or_else(|| GolensError::MethodNotFound {
                    package: import_path.to_string(),
                    type_name: type_name.to_string(),
                    name: method_name.to_string(),
                });
        }

        pkg.funcs
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| GolensError::FunctionNotFound {
                package: import_path.to_string(),
                name: name.to_string(),
            })
    }

    /// Looks up a named type.
    pub fn type_info(&self, import_path: &str, name: &str) -> Result<TypeInfo> {
        let pkg = self
            .snap
            .packages()
            .get(import_path)
            .ok_or_else(|| GolensError::PackageNotFound(import_path.to_string()))?;
        pkg.types
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| GolensError::TypeNotFound {
                package: import_path.to_string(),
                name: name.to_string(),
            })
    }

    /// Finds every indexed concrete type whose method set satisfies the
    /// named interface, reporting the satisfying form for each.
    pub fn implementations(
        &self,
        import_path: &str,
        interface_name: &str,
    ) -> Result<Vec<Implementation>> {
        satisfy::implementations(self.snap, import_path, interface_name)
    }
}

fn file_matches(loc_file: &str, query: &str, is_abs: bool) -> bool {
    if is_abs {
        loc_file == query
    } else {
        loc_file.ends_with(&format!("/{query}"))
    }
}

fn filter_funcs(funcs: Vec<FuncInfo>, include_unexported: bool) -> Vec<FuncInfo> {
    if include_unexported {
        return funcs;
    }
    funcs
        .into_iter()
        .filter(|f| model::is_exported(&f.name))
        .collect()
}

fn filter_types(types: Vec<TypeInfo>, include_unexported: bool) -> Vec<TypeInfo> {
    if include_unexported {
        return types;
    }
    types
        .into_iter()
        .filter(|t| model::is_exported(&t.name))
        .collect()
}

fn filter_vars(vars: Vec<VarInfo>, include_unexported: bool) -> Vec<VarInfo> {
    if include_unexported {
        return vars;
    }
    vars.into_iter()
        .filter(|v| model::is_exported(&v.name))
        .collect()
}
