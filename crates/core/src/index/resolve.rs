//! Name resolution and method-set computation.
//!
//! The loader keeps, for every loaded package (dependencies included), a
//! resolved type scope. Scopes carry canonical signature representations:
//! every named type is qualified with its import path, so two signatures
//! compare equal across packages regardless of local import aliasing. The
//! method-set walk below is the explicit counterpart of Go's selector rules:
//! promotion through embedded fields, pointer-vs-value receiver visibility,
//! shallowest-declaration shadowing, and same-depth ambiguity.

use std::collections::{BTreeMap, BTreeSet};

use tree_sitter::Node;

use crate::index::format::{self, ParamGroup};
use crate::model::{FuncInfo, TypeKind};

/// Predeclared Go type identifiers. These stay unqualified in canonical
/// renderings; any other bare identifier resolves to the declaring package.
const BUILTIN_TYPES: &[&str] = &[
    "any",
    "bool",
    "byte",
    "comparable",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// Resolution context for one source file: the declaring package's import
/// path plus the file's import table (local name → import path).
pub(crate) struct FileContext<'a> {
    pub pkg_path: &'a str,
    pub imports: &'a BTreeMap<String, String>,
}

impl FileContext<'_> {
    /// Renders a type expression in canonical form, qualifying every named
    /// type with its import path.
    pub fn canonical(&self, node: Node<'_>, src: &str) -> String {
        let text = |n: Node<'_>| n.utf8_text(src.as_bytes()).unwrap_or_default().to_string();
        match node.kind() {
            "type_identifier" => {
                let name = text(node);
                if is_builtin(&name) {
                    name
                } else {
                    format!("{}.{}", self.pkg_path, name)
                }
            }
            "qualified_type" => {
                let pkg = node.child_by_field_name("package").map(text).unwrap_or_default();
                let name = node.child_by_field_name("name").map(text).unwrap_or_default();
                let path = self.imports.get(&pkg).cloned().unwrap_or(pkg);
                format!("{path}.{name}")
            }
            "pointer_type" => match node.named_child(0) {
                Some(inner) => format!("*{}", self.canonical(inner, src)),
                None => text(node),
            },
            "slice_type" => match node.child_by_field_name("element").or_else(|| node.named_child(0)) {
                Some(elem) => format!("[]{}", self.canonical(elem, src)),
                None => text(node),
            },
            "array_type" => {
                let len = node.child_by_field_name("length").map(text).unwrap_or_default();
                match node.child_by_field_name("element") {
                    Some(elem) => format!("[{len}]{}", self.canonical(elem, src)),
                    None => text(node),
                }
            }
            "map_type" => {
                match (
                    node.child_by_field_name("key"),
                    node.child_by_field_name("value"),
                ) {
                    (Some(k), Some(v)) => {
                        format!("map[{}]{}", self.canonical(k, src), self.canonical(v, src))
                    }
                    _ => text(node),
                }
            }
            "channel_type" => {
                let raw = text(node);
                let dir = if raw.starts_with("<-chan") {
                    "<-chan "
                } else if raw.starts_with("chan<-") {
                    "chan<- "
                } else {
                    "chan "
                };
                match node.child_by_field_name("value") {
                    Some(v) => format!("{dir}{}", self.canonical(v, src)),
                    None => format::normalize_ws(&raw),
                }
            }
            "function_type" => {
                let (_, params, variadic) = match node.child_by_field_name("parameters") {
                    Some(list) => self.signature_params(list, src),
                    None => (Vec::new(), Vec::new(), false),
                };
                let mut rendered: Vec<String> = params;
                if variadic {
                    if let Some(last) = rendered.last_mut() {
                        *last = format!("...{last}");
                    }
                }
                let results = match node.child_by_field_name("result") {
                    Some(res) if res.kind() == "parameter_list" => {
                        let (_, canon, _) = self.signature_params(res, src);
                        canon
                    }
                    Some(res) => vec![self.canonical(res, src)],
                    None => Vec::new(),
                };
                let tail = match results.as_slice() {
                    [] => String::new(),
                    [one] => format!(" {one}"),
                    many => format!(" ({})", many.join(", ")),
                };
                format!("func({}){}", rendered.join(", "), tail)
            }
            "generic_type" => {
                let base = match node.child_by_field_name("type") {
                    Some(b) => self.canonical(b, src),
                    None => return format::normalize_ws(&text(node)),
                };
                let mut args = Vec::new();
                if let Some(list) = node.child_by_field_name("type_arguments") {
                    let mut cursor = list.walk();
                    for arg in list.named_children(&mut cursor) {
                        args.push(self.canonical(arg, src));
                    }
                }
                format!("{base}[{}]", args.join(", "))
            }
            "parenthesized_type" => match node.named_child(0) {
                Some(inner) => self.canonical(inner, src),
                None => text(node),
            },
            // Anonymous struct/interface literals and anything unrecognized
            // fall back to their normalized source text.
            _ => format::normalize_ws(&text(node)),
        }
    }

    /// Collects a parameter list as display groups plus the canonical type
    /// list (one entry per declared name) and the trailing-variadic flag.
    pub fn signature_params(
        &self,
        list: Node<'_>,
        src: &str,
    ) -> (Vec<ParamGroup>, Vec<String>, bool) {
        let text = |n: Node<'_>| n.utf8_text(src.as_bytes()).unwrap_or_default().to_string();
        let mut groups = Vec::new();
        let mut canonical = Vec::new();
        let mut variadic = false;
        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            match child.kind() {
                "parameter_declaration" => {
                    let mut names = Vec::new();
                    let mut name_cursor = child.walk();
                    for name in child.children_by_field_name("name", &mut name_cursor) {
                        names.push(text(name));
                    }
                    let Some(ty) = child.child_by_field_name("type") else {
                        continue;
                    };
                    let canon = self.canonical(ty, src);
                    for _ in 0..names.len().max(1) {
                        canonical.push(canon.clone());
                    }
                    groups.push(ParamGroup {
                        names,
                        type_text: format::normalize_ws(&text(ty)),
                        variadic: false,
                    });
                }
                "variadic_parameter_declaration" => {
                    let names = child
                        .child_by_field_name("name")
                        .map(|n| vec![text(n)])
                        .unwrap_or_default();
                    let Some(ty) = child.child_by_field_name("type") else {
                        continue;
                    };
                    canonical.push(self.canonical(ty, src));
                    variadic = true;
                    groups.push(ParamGroup {
                        names,
                        type_text: format::normalize_ws(&text(ty)),
                        variadic: true,
                    });
                }
                _ => {}
            }
        }
        (groups, canonical, variadic)
    }

    /// Resolves a type expression to the `(import path, type name)` pair of
    /// the named type it denotes, if any. Builtins resolve to `None`.
    pub fn resolve_named(&self, node: Node<'_>, src: &str) -> Option<(String, String)> {
        let text = |n: Node<'_>| n.utf8_text(src.as_bytes()).unwrap_or_default().to_string();
        match node.kind() {
            "type_identifier" => {
                let name = text(node);
                if is_builtin(&name) {
                    None
                } else {
                    Some((self.pkg_path.to_string(), name))
                }
            }
            "qualified_type" => {
                let pkg = node.child_by_field_name("package").map(text)?;
                let name = node.child_by_field_name("name").map(text)?;
                let path = self.imports.get(&pkg).cloned().unwrap_or(pkg);
                Some((path, name))
            }
            "pointer_type" | "parenthesized_type" => {
                self.resolve_named(node.named_child(0)?, src)
            }
            "generic_type" => self.resolve_named(node.child_by_field_name("type")?, src),
            _ => None,
        }
    }
}

/// Language-neutral signature used for structural comparison: ordered
/// canonical parameter types, ordered canonical result types, variadic flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MethodSig {
    pub params: Vec<String>,
    pub results: Vec<String>,
    pub variadic: bool,
}

/// A resolved reference to a named type reachable through embedding.
#[derive(Debug, Clone)]
pub(crate) struct EmbedRef {
    pub display: String,
    pub pointer: bool,
    pub target: Option<(String, String)>,
}

/// One directly declared method, with its comparison signature and the
/// fully rendered record handed out by queries.
#[derive(Debug, Clone)]
pub(crate) struct MethodRecord {
    pub name: String,
    pub pointer_recv: bool,
    pub sig: MethodSig,
    pub info: FuncInfo,
}

/// Resolved shape of one named type inside a package scope.
#[derive(Debug, Clone)]
pub(crate) struct TypeEntry {
    pub kind: TypeKind,
    pub embeds: Vec<EmbedRef>,
    pub methods: Vec<MethodRecord>,
    pub iface_methods: Vec<(String, MethodSig)>,
    pub iface_embeds: Vec<EmbedRef>,
    pub alias_target: Option<EmbedRef>,
}

impl TypeEntry {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            embeds: Vec::new(),
            methods: Vec::new(),
            iface_methods: Vec::new(),
            iface_embeds: Vec::new(),
            alias_target: None,
        }
    }
}

/// The resolved type scope of one loaded package. Retained for every loaded
/// package — dependencies included — so satisfaction checks can cross the
/// root boundary.
#[derive(Debug, Clone)]
pub(crate) struct PackageScope {
    pub import_path: String,
    pub name: String,
    pub types: BTreeMap<String, TypeEntry>,
    pub funcs: BTreeSet<String>,
    pub vars: BTreeSet<String>,
}

/// Computed method sets of a named type: everything selectable on a value of
/// the type and everything selectable through a pointer to it. Keys are
/// method names; values carry the embedding depth (0 = declared directly).
#[derive(Debug, Default)]
pub(crate) struct MethodSets {
    pub value: BTreeMap<String, (usize, MethodRecord)>,
    pub pointer: BTreeMap<String, (usize, MethodRecord)>,
}

const MAX_EMBED_DEPTH: usize = 32;
const MAX_ALIAS_HOPS: usize = 8;
const MAX_FRONTIER: usize = 4096;

/// Follows alias declarations to the concrete entry they denote.
pub(crate) fn resolve_entry<'a>(
    scopes: &'a BTreeMap<String, PackageScope>,
    pkg: &str,
    name: &str,
) -> Option<(String, String, &'a TypeEntry)> {
    let mut pkg = pkg.to_string();
    let mut name = name.to_string();
    for _ in 0..MAX_ALIAS_HOPS {
        let entry = scopes.get(&pkg)?.types.get(&name)?;
        if entry.kind != TypeKind::Alias {
            return Some((pkg, name, entry));
        }
        let (next_pkg, next_name) = entry.alias_target.as_ref()?.target.clone()?;
        pkg = next_pkg;
        name = next_name;
    }
    None
}

/// Computes the value and pointer method sets of a named type by walking its
/// embedding edges breadth-first. The shallowest declaration of a name wins;
/// two providers at the same depth make the name unavailable, matching Go's
/// ambiguous-selector rule.
pub(crate) fn method_sets(
    scopes: &BTreeMap<String, PackageScope>,
    pkg: &str,
    type_name: &str,
) -> MethodSets {
    let mut sets = MethodSets::default();
    let mut dead_value: BTreeSet<String> = BTreeSet::new();
    let mut dead_pointer: BTreeSet<String> = BTreeSet::new();
    // Types visited at shallower depths. Duplicates are allowed *within* a
    // level: two same-depth paths to one type are exactly what makes a
    // selector ambiguous.
    let mut seen: BTreeSet<(String, String, bool)> = BTreeSet::new();

    // Frontier entries: (package, type, reached through a pointer embed).
    let mut level: Vec<(String, String, bool)> = vec![(pkg.to_string(), type_name.to_string(), false)];

    for depth in 0..=MAX_EMBED_DEPTH {
        if level.is_empty() || level.len() > MAX_FRONTIER {
            break;
        }
        for entry in &level {
            seen.insert(entry.clone());
        }
        let mut value_adds: BTreeMap<String, Vec<MethodRecord>> = BTreeMap::new();
        let mut pointer_adds: BTreeMap<String, Vec<MethodRecord>> = BTreeMap::new();
        let mut next_level = Vec::new();

        for (cur_pkg, cur_name, via_pointer) in level {
            let Some((_, _, entry)) = resolve_entry(scopes, &cur_pkg, &cur_name) else {
                continue;
            };
            for record in &entry.methods {
                pointer_adds
                    .entry(record.name.clone())
                    .or_default()
                    .push(record.clone());
                // A pointer-receiver method is reachable on the value form
                // only when some hop on the path was a pointer embed.
                if via_pointer || !record.pointer_recv {
                    value_adds
                        .entry(record.name.clone())
                        .or_default()
                        .push(record.clone());
                }
            }
            for embed in entry.embeds.iter().chain(entry.iface_embeds.iter()) {
                if let Some((tpkg, tname)) = embed.target.clone() {
                    let next = (tpkg, tname, via_pointer || embed.pointer);
                    if !seen.contains(&next) {
                        next_level.push(next);
                    }
                }
            }
        }

        merge_level(&mut sets.value, &mut dead_value, value_adds, depth);
        merge_level(&mut sets.pointer, &mut dead_pointer, pointer_adds, depth);
        level = next_level;
    }

    sets
}

fn merge_level(
    set: &mut BTreeMap<String, (usize, MethodRecord)>,
    dead: &mut BTreeSet<String>,
    adds: BTreeMap<String, Vec<MethodRecord>>,
    depth: usize,
) {
    for (name, mut records) in adds {
        if set.contains_key(&name) || dead.contains(&name) {
            continue;
        }
        if records.len() > 1 {
            dead.insert(name);
            continue;
        }
        if let Some(record) = records.pop() {
            set.insert(name, (depth, record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, pointer_recv: bool) -> MethodRecord {
        MethodRecord {
            name: name.to_string(),
            pointer_recv,
            sig: MethodSig::default(),
            info: FuncInfo {
                name: name.to_string(),
                ..FuncInfo::default()
            },
        }
    }

    fn scope(path: &str, types: Vec<(&str, TypeEntry)>) -> (String, PackageScope) {
        (
            path.to_string(),
            PackageScope {
                import_path: path.to_string(),
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                types: types.into_iter().map(|(n, e)| (n.to_string(), e)).collect(),
                funcs: BTreeSet::new(),
                vars: BTreeSet::new(),
            },
        )
    }

    fn embed(pkg: &str, name: &str, pointer: bool) -> EmbedRef {
        EmbedRef {
            display: name.to_string(),
            pointer,
            target: Some((pkg.to_string(), name.to_string())),
        }
    }

    #[test]
    fn pointer_receiver_excluded_from_value_set() {
        let mut entry = TypeEntry::new(TypeKind::Struct);
        entry.methods = vec![record("Ptr", true), record("Val", false)];
        let scopes: BTreeMap<_, _> = [scope("p", vec![("T", entry)])].into();

        let sets = method_sets(&scopes, "p", "T");
        assert!(sets.value.contains_key("Val"));
        assert!(!sets.value.contains_key("Ptr"));
        assert!(sets.pointer.contains_key("Val"));
        assert!(sets.pointer.contains_key("Ptr"));
    }

    #[test]
    fn promotion_through_value_embed() {
        let mut inner = TypeEntry::new(TypeKind::Struct);
        inner.methods = vec![record("Ptr", true), record("Val", false)];
        let mut outer = TypeEntry::new(TypeKind::Struct);
        outer.embeds = vec![embed("p", "Inner", false)];
        let scopes: BTreeMap<_, _> =
            [scope("p", vec![("Inner", inner), ("Outer", outer)])].into();

        let sets = method_sets(&scopes, "p", "Outer");
        assert_eq!(sets.value.get("Val").map(|(d, _)| *d), Some(1));
        assert!(!sets.value.contains_key("Ptr"));
        assert_eq!(sets.pointer.get("Ptr").map(|(d, _)| *d), Some(1));
    }

    #[test]
    fn pointer_embed_exposes_pointer_methods_on_value() {
        let mut inner = TypeEntry::new(TypeKind::Struct);
        inner.methods = vec![record("Ptr", true)];
        let mut outer = TypeEntry::new(TypeKind::Struct);
        outer.embeds = vec![embed("p", "Inner", true)];
        let scopes: BTreeMap<_, _> =
            [scope("p", vec![("Inner", inner), ("Outer", outer)])].into();

        let sets = method_sets(&scopes, "p", "Outer");
        assert!(sets.value.contains_key("Ptr"));
    }

    #[test]
    fn shallow_declaration_shadows_embedded() {
        let mut inner = TypeEntry::new(TypeKind::Struct);
        inner.methods = vec![record("Name", false)];
        let mut outer = TypeEntry::new(TypeKind::Struct);
        outer.methods = vec![record("Name", false)];
        outer.embeds = vec![embed("p", "Inner", false)];
        let scopes: BTreeMap<_, _> =
            [scope("p", vec![("Inner", inner), ("Outer", outer)])].into();

        let sets = method_sets(&scopes, "p", "Outer");
        assert_eq!(sets.pointer.get("Name").map(|(d, _)| *d), Some(0));
    }

    #[test]
    fn same_depth_conflict_is_unavailable() {
        let mut a = TypeEntry::new(TypeKind::Struct);
        a.methods = vec![record("Clash", false)];
        let mut b = TypeEntry::new(TypeKind::Struct);
        b.methods = vec![record("Clash", false)];
        let mut outer = TypeEntry::new(TypeKind::Struct);
        outer.embeds = vec![embed("p", "A", false), embed("p", "B", false)];
        let scopes: BTreeMap<_, _> =
            [scope("p", vec![("A", a), ("B", b), ("Outer", outer)])].into();

        let sets = method_sets(&scopes, "p", "Outer");
        assert!(!sets.pointer.contains_key("Clash"));
        assert!(!sets.value.contains_key("Clash"));
    }

    #[test]
    fn embedding_cycles_terminate() {
        let mut a = TypeEntry::new(TypeKind::Struct);
        a.embeds = vec![embed("p", "B", false)];
        a.methods = vec![record("FromA", false)];
        let mut b = TypeEntry::new(TypeKind::Struct);
        b.embeds = vec![embed("p", "A", false)];
        b.methods = vec![record("FromB", false)];
        let scopes: BTreeMap<_, _> = [scope("p", vec![("A", a), ("B", b)])].into();

        let sets = method_sets(&scopes, "p", "A");
        assert!(sets.pointer.contains_key("FromA"));
        assert!(sets.pointer.contains_key("FromB"));
    }
}
