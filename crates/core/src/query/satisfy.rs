//! Structural interface satisfaction.
//!
//! An interface is a set of required method signatures; a concrete type
//! satisfies it iff its computed method set is a superset by name and
//! signature. The comparison runs over the canonical signature
//! representation the loader resolved, so it crosses package boundaries
//! exactly. Pointer-receiver methods are only reachable through the pointer
//! form, which is why satisfaction is tested once per form.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::GolensError;
use crate::index::resolve::{self, MethodRecord, MethodSig};
use crate::index::Snapshot;
use crate::model::{Implementation, Satisfaction, TypeKind};
use crate::Result;

pub(super) fn implementations(
    snap: &Snapshot,
    import_path: &str,
    interface_name: &str,
) -> Result<Vec<Implementation>> {
    let scopes = snap.scopes();
    let scope = scopes
        .get(import_path)
        .ok_or_else(|| GolensError::PackageNotFound(import_path.to_string()))?;

    let entry = match scope.types.get(interface_name) {
        Some(entry) => entry,
        None => {
            let err = if scope.funcs.contains(interface_name) || scope.vars.contains(interface_name)
            {
                GolensError::NotAType {
                    package: import_path.to_string(),
                    name: interface_name.to_string(),
                }
            } else {
                GolensError::SymbolNotFound {
                    package: import_path.to_string(),
                    name: interface_name.to_string(),
                }
            };
            return Err(err);
        }
    };

    // An alias of an interface is queryable through the alias name.
    let (iface_pkg, iface_name) = if entry.kind == TypeKind::Interface {
        (import_path.to_string(), interface_name.to_string())
    } else {
        let resolved = resolve::resolve_entry(scopes, import_path, interface_name);
        match resolved {
            Some((pkg, name, target)) if target.kind == TypeKind::Interface => (pkg, name),
            _ => {
                return Err(GolensError::NotAnInterface {
                    package: import_path.to_string(),
                    name: interface_name.to_string(),
                });
            }
        }
    };

    let mut visited = BTreeSet::new();
    let requirements = requirements(snap, &iface_pkg, &iface_name, &mut visited);

    let mut result = Vec::new();
    for (pkg_path, pkg) in snap.packages() {
        for ty in &pkg.types {
            if ty.kind == TypeKind::Interface {
                continue;
            }
            let Some((concrete_pkg, concrete_name, concrete)) =
                resolve::resolve_entry(scopes, pkg_path, &ty.name)
            else {
                continue;
            };
            if concrete.kind == TypeKind::Interface {
                continue;
            }
            let sets = resolve::method_sets(scopes, &concrete_pkg, &concrete_name);
            let satisfies = if covers(&sets.value, &requirements) {
                Some(Satisfaction::Value)
            } else if covers(&sets.pointer, &requirements) {
                Some(Satisfaction::Pointer)
            } else {
                None
            };
            if let Some(satisfies) = satisfies {
                result.push(Implementation {
                    type_info: ty.clone(),
                    satisfies,
                });
            }
        }
    }
    Ok(result)
}

/// Collects the full requirement set of an interface: declared methods plus,
/// transitively, those of resolvable embedded interfaces. The builtin
/// `error` contributes `Error() string`; `any` and `comparable` contribute
/// nothing; an embedded interface the index cannot resolve (typically the
/// unindexed standard library) contributes nothing and is logged.
fn requirements(
    snap: &Snapshot,
    pkg: &str,
    name: &str,
    visited: &mut BTreeSet<(String, String)>,
) -> BTreeMap<String, MethodSig> {
    let mut reqs = BTreeMap::new();
    if !visited.insert((pkg.to_string(), name.to_string())) {
        return reqs;
    }
    let Some((_, _, entry)) = resolve::resolve_entry(snap.scopes(), pkg, name) else {
        debug!(package = pkg, interface = name, "embedded interface not resolvable");
        return reqs;
    };
    if entry.kind != TypeKind::Interface {
        return reqs;
    }
    for (method_name, sig) in &entry.iface_methods {
        reqs.entry(method_name.clone()).or_insert_with(|| sig.clone());
    }
    for embed in &entry.iface_embeds {
        match embed.display.as_str() {
            "error" => {
                reqs.entry("Error".to_string()).or_insert_with(|| MethodSig {
                    params: Vec::new(),
                    results: vec!["string".to_string()],
                    variadic: false,
                });
                continue;
            }
            "any" | "comparable" => continue,
            _ => {}
        }
        match &embed.target {
            Some((target_pkg, target_name)) => {
                for (method_name, sig) in requirements(snap, target_pkg, target_name, visited) {
                    reqs.entry(method_name).or_insert(sig);
                }
            }
            None => {
                debug!(
                    package = pkg,
                    interface = name,
                    embed = %embed.display,
                    "skipping unresolvable interface embed"
                );
            }
        }
    }
    reqs
}

fn covers(
    set: &BTreeMap<String, (usize, MethodRecord)>,
    requirements: &BTreeMap<String, MethodSig>,
) -> bool {
    requirements.iter().all(|(name, sig)| {
        set.get(name)
            .is_some_and(|(_, record)| record.sig == *sig)
    })
}
