//! Value types for the symbol index.
//!
//! Everything here is a plain data carrier: the loader fills these in once
//! per build and the query layer reads them. All types serialize to the JSON
//! shape the MCP boundary exposes; optional fields are omitted when empty.

use serde::{Deserialize, Serialize};

/// Source position of a declaration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

/// A single named (non-embedded) field of a struct type.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// A function or method.
///
/// `receiver` is empty for package-level functions. For methods it carries
/// the qualified receiver rendering (`*import/path.TypeName`), while
/// `signature` keeps the source-level form (`func (e *English) Greet(...)`).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncInfo {
    pub name: String,
    pub package: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub receiver: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_promoted: bool,
    pub location: Location,
}

/// Classification of a named type by its underlying representation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Struct,
    Interface,
    Alias,
    Other,
}

/// A named type.
///
/// For structs, `methods` is the full externally visible method set computed
/// through the pointer form, promoted methods included, sorted by name. For
/// interfaces it holds only the explicitly declared methods; embedded
/// interfaces stay in `embeds` and are never flattened in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub package: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<FuncInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    pub location: Location,
}

/// A package-level variable or constant.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VarInfo {
    pub name: String,
    pub package: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,
    pub is_const: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    pub location: Location,
}

/// All indexed symbols of a single package.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub import_path: String,
    pub name: String,
    pub dir: String,
    pub files: Vec<String>,
    pub funcs: Vec<FuncInfo>,
    pub types: Vec<TypeInfo>,
    pub vars: Vec<VarInfo>,
}

/// Per-package summary row returned by the package listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub import_path: String,
    pub name: String,
    pub dir: String,
    pub file_count: usize,
    pub func_count: usize,
    pub type_count: usize,
}

/// Grouped symbol listing for one package or one file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSymbols {
    pub funcs: Vec<FuncInfo>,
    pub types: Vec<TypeInfo>,
    pub vars: Vec<VarInfo>,
}

/// Classification of a cross-package search hit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Func,
    Method,
    Type,
    Var,
    Const,
}

/// Lightweight reference returned by cross-package symbol search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub name: String,
    pub package: String,
    pub kind: SymbolKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub receiver: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    pub location: Location,
}

/// How a concrete type satisfies an interface: through its value method set
/// or only through the pointer form's.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Satisfaction {
    Value,
    Pointer,
}

/// One interface-implementation hit: the concrete type plus the form it
/// satisfies the interface through.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Implementation {
    #[serde(flatten)]
    pub type_info: TypeInfo,
    pub satisfies: Satisfaction,
}

/// Reports whether a symbol name is exported under the first-letter
/// capitalization convention.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_names() {
        assert!(is_exported("Greet"));
        assert!(is_exported("Ω"));
        assert!(!is_exported("greet"));
        assert!(!is_exported("_hidden"));
        assert!(!is_exported(""));
    }
}
