//! Per-file declaration extraction.
//!
//! One `GoParser` walks a file's syntax tree and lifts every top-level
//! declaration into raw records: functions and methods with rendered
//! signatures and canonical comparison signatures, named types with their
//! fields, embeds and interface members, and package-level values. Broken
//! constructs are skipped rather than failing the file; whole-file failures
//! (unreadable, no package clause) are reported to the caller, who decides
//! whether to drop the package.

use std::collections::BTreeMap;
use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::error::GolensError;
use crate::index::format::{self, ParamGroup};
use crate::index::resolve::{EmbedRef, FileContext, MethodRecord, MethodSig};
use crate::model::{FieldInfo, FuncInfo, Location, TypeKind, VarInfo};
use crate::Result;

#[derive(Debug, Clone)]
pub(crate) struct RawReceiver {
    pub name: String,
    pub base: String,
    pub pointer: bool,
    pub display: String,
}

#[derive(Debug, Clone)]
pub(crate) struct RawFunc {
    pub receiver: Option<RawReceiver>,
    pub sig: MethodSig,
    pub info: FuncInfo,
}

#[derive(Debug, Clone)]
pub(crate) struct RawType {
    pub name: String,
    pub kind: TypeKind,
    pub fields: Vec<FieldInfo>,
    pub embeds: Vec<EmbedRef>,
    pub iface_methods: Vec<MethodRecord>,
    pub iface_embeds: Vec<EmbedRef>,
    pub alias_target: Option<EmbedRef>,
    pub doc: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub(crate) struct ParsedFile {
    pub package_name: String,
    pub funcs: Vec<RawFunc>,
    pub types: Vec<RawType>,
    pub values: Vec<VarInfo>,
}

pub(crate) struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| GolensError::Parsing(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parses one source file into raw declaration records. `pkg_path` is the
    /// import path the file's package resolves under.
    pub fn parse_file(&mut self, pkg_path: &str, path: &Path, source: &str) -> Result<ParsedFile> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| GolensError::Parsing(format!("failed to parse {}", path.display())))?;
        let root = tree.root_node();
        let file = path.to_string_lossy().to_string();

        let package_name = package_name(root, source).unwrap_or_default();
        let imports = collect_imports(root, source);
        let ctx = FileContext {
            pkg_path,
            imports: &imports,
        };

        let mut parsed = ParsedFile {
            package_name,
            funcs: Vec::new(),
            types: Vec::new(),
            values: Vec::new(),
        };

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(func) = function(&ctx, child, source, &file) {
                        parsed.funcs.push(func);
                    }
                }
                "type_declaration" => {
                    type_declaration(&ctx, child, source, &file, &mut parsed.types);
                }
                "var_declaration" => {
                    value_declaration(&ctx, child, source, &file, false, &mut parsed.values);
                }
                "const_declaration" => {
                    value_declaration(&ctx, child, source, &file, true, &mut parsed.values);
                }
                _ => {}
            }
        }

        Ok(parsed)
    }
}

fn node_text(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or_default().to_string()
}

fn package_name(root: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "package_clause" {
            let mut inner = child.walk();
            for part in child.named_children(&mut inner) {
                if part.kind() == "package_identifier" {
                    return Some(node_text(part, source));
                }
            }
        }
    }
    None
}

/// Builds the file's import table: local name → import path. The local name
/// defaults to the final path segment, skipping `vN` version suffixes; blank
/// and dot imports contribute nothing resolvable.
fn collect_imports(root: Node<'_>, source: &str) -> BTreeMap<String, String> {
    let mut imports = BTreeMap::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() != "import_declaration" {
            continue;
        }
        let mut stack = vec![child];
        while let Some(node) = stack.pop() {
            let mut inner = node.walk();
            for part in node.named_children(&mut inner) {
                match part.kind() {
                    "import_spec_list" => stack.push(part),
                    "import_spec" => {
                        let Some(path_node) = part.child_by_field_name("path") else {
                            continue;
                        };
                        let path = node_text(path_node, source)
                            .trim_matches(['"', '`'])
                            .to_string();
                        let alias = part
                            .child_by_field_name("name")
                            .map(|n| node_text(n, source));
                        let local = match alias.as_deref() {
                            Some("_") | Some(".") => continue,
                            Some(name) => name.to_string(),
                            None => default_local_name(&path),
                        };
                        imports.insert(local, path);
                    }
                    _ => {}
                }
            }
        }
    }
    imports
}

fn default_local_name(import_path: &str) -> String {
    let mut segments = import_path.rsplit('/');
    let last = segments.next().unwrap_or(import_path);
    if last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit())
    {
        if let Some(prev) = segments.next() {
            return prev.to_string();
        }
    }
    last.to_string()
}

/// Gathers the comment block immediately above `node`. A comment that trails
/// another declaration on the same line is not part of the block.
fn doc_before(node: Node<'_>, source: &str) -> String {
    let mut raw = Vec::new();
    let mut expect_row = node.start_position().row;
    let mut cur = node.prev_sibling();
    while let Some(n) = cur {
        if n.kind() != "comment" || n.end_position().row + 1 != expect_row {
            break;
        }
        if let Some(prev) = n.prev_sibling() {
            if prev.end_position().row == n.start_position().row {
                break;
            }
        }
        raw.push(node_text(n, source));
        expect_row = n.start_position().row;
        cur = n.prev_sibling();
    }
    raw.reverse();
    let refs: Vec<&str> = raw.iter().map(String::as_str).collect();
    format::clean_comment(&refs)
}

/// A comment sitting on the same line after `node`, if any.
fn trailing_comment(node: Node<'_>, source: &str) -> String {
    match node.next_sibling() {
        Some(n) if n.kind() == "comment" && n.start_position().row == node.end_position().row => {
            format::clean_comment(&[&node_text(n, source)])
        }
        _ => String::new(),
    }
}

fn location(name_node: Node<'_>, file: &str) -> Location {
    Location {
        file: file.to_string(),
        line: name_node.start_position().row + 1,
    }
}

fn qualified_receiver(pkg_path: &str, base: &str, pointer: bool) -> String {
    if pointer {
        format!("*{pkg_path}.{base}")
    } else {
        format!("{pkg_path}.{base}")
    }
}

/// The declared name of the named type a receiver or embed expression
/// ultimately refers to.
fn base_type_name(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "type_identifier" => node_text(node, source),
        "pointer_type" | "parenthesized_type" => node
            .named_child(0)
            .map(|n| base_type_name(n, source))
            .unwrap_or_default(),
        "generic_type" => node
            .child_by_field_name("type")
            .map(|n| base_type_name(n, source))
            .unwrap_or_default(),
        "qualified_type" => node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn function(ctx: &FileContext<'_>, node: Node<'_>, source: &str, file: &str) -> Option<RawFunc> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source);

    let receiver = node.child_by_field_name("receiver").and_then(|list| {
        let mut cursor = list.walk();
        let param = list
            .named_children(&mut cursor)
            .find(|n| n.kind() == "parameter_declaration")?;
        let ty = param.child_by_field_name("type")?;
        let recv_name = param
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_default();
        let pointer = ty.kind() == "pointer_type";
        Some(RawReceiver {
            name: recv_name,
            base: base_type_name(ty, source),
            pointer,
            display: format::normalize_ws(&node_text(ty, source)),
        })
    });

    let (param_groups, canonical_params, variadic) = match node.child_by_field_name("parameters") {
        Some(list) => ctx.signature_params(list, source),
        None => (Vec::new(), Vec::new(), false),
    };
    let (result_groups, canonical_results) = results(ctx, node, source);

    let signature = format::render_signature(
        &name,
        receiver
            .as_ref()
            .map(|r| (r.name.as_str(), r.display.as_str())),
        &param_groups,
        &result_groups,
    );

    let body = node
        .child_by_field_name("body")
        .map(|b| node_text(b, source))
        .unwrap_or_default();

    let info = FuncInfo {
        name: name.clone(),
        package: ctx.pkg_path.to_string(),
        receiver: receiver
            .as_ref()
            .map(|r| qualified_receiver(ctx.pkg_path, &r.base, r.pointer))
            .unwrap_or_default(),
        signature,
        doc: doc_before(node, source),
        body,
        is_promoted: false,
        location: location(name_node, file),
    };

    Some(RawFunc {
        receiver,
        sig: MethodSig {
            params: canonical_params,
            results: canonical_results,
            variadic,
        },
        info,
    })
}

fn results(
    ctx: &FileContext<'_>,
    node: Node<'_>,
    source: &str,
) -> (Vec<ParamGroup>, Vec<String>) {
    match node.child_by_field_name("result") {
        Some(res) if res.kind() == "parameter_list" => {
            let (groups, canonical, _) = ctx.signature_params(res, source);
            (groups, canonical)
        }
        Some(res) => (
            vec![ParamGroup {
                names: Vec::new(),
                type_text: format::normalize_ws(&node_text(res, source)),
                variadic: false,
            }],
            vec![ctx.canonical(res, source)],
        ),
        None => (Vec::new(), Vec::new()),
    }
}

fn type_declaration(
    ctx: &FileContext<'_>,
    decl: Node<'_>,
    source: &str,
    file: &str,
    out: &mut Vec<RawType>,
) {
    let mut specs = Vec::new();
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        if matches!(child.kind(), "type_spec" | "type_alias") {
            specs.push(child);
        }
    }
    let group_doc = doc_before(decl, source);
    let count = specs.len();

    for spec in specs {
        let Some(name_node) = spec.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, source);
        let doc = format::spec_doc(doc_before(spec, source), &group_doc, count);
        let loc = location(name_node, file);

        if spec.kind() == "type_alias" {
            out.push(RawType {
                name,
                kind: TypeKind::Alias,
                fields: Vec::new(),
                embeds: Vec::new(),
                iface_methods: Vec::new(),
                iface_embeds: Vec::new(),
                alias_target: spec
                    .child_by_field_name("type")
                    .map(|ty| embed_ref(ctx, ty, source, false)),
                doc,
                location: loc,
            });
            continue;
        }

        let Some(ty) = spec.child_by_field_name("type") else {
            continue;
        };
        let mut raw = RawType {
            name: name.clone(),
            kind: TypeKind::Other,
            fields: Vec::new(),
            embeds: Vec::new(),
            iface_methods: Vec::new(),
            iface_embeds: Vec::new(),
            alias_target: None,
            doc,
            location: loc,
        };
        match ty.kind() {
            "struct_type" => {
                raw.kind = TypeKind::Struct;
                struct_members(ctx, ty, source, &mut raw);
            }
            "interface_type" => {
                raw.kind = TypeKind::Interface;
                interface_members(ctx, ty, source, file, &name, &mut raw);
            }
            _ => {}
        }
        out.push(raw);
    }
}

fn embed_ref(ctx: &FileContext<'_>, ty: Node<'_>, source: &str, pointer: bool) -> EmbedRef {
    let star = if pointer { "*" } else { "" };
    EmbedRef {
        display: format!("{star}{}", format::normalize_ws(&node_text(ty, source))),
        pointer,
        target: ctx.resolve_named(ty, source),
    }
}

fn struct_members(ctx: &FileContext<'_>, ty: Node<'_>, source: &str, raw: &mut RawType) {
    let mut cursor = ty.walk();
    let Some(list) = ty
        .named_children(&mut cursor)
        .find(|n| n.kind() == "field_declaration_list")
    else {
        return;
    };
    let mut list_cursor = list.walk();
    for field in list.named_children(&mut list_cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let Some(ty_node) = field.child_by_field_name("type") else {
            continue;
        };
        let mut names = Vec::new();
        let mut name_cursor = field.walk();
        for name in field.children_by_field_name("name", &mut name_cursor) {
            names.push(node_text(name, source));
        }

        if names.is_empty() {
            let pointer = node_text(field, source).trim_start().starts_with('*');
            raw.embeds.push(embed_ref(ctx, ty_node, source, pointer));
            continue;
        }

        let tag = field
            .child_by_field_name("tag")
            .map(|t| node_text(t, source).trim_matches(['`', '"']).to_string())
            .unwrap_or_default();
        let leading = doc_before(field, source);
        let comment = if leading.is_empty() {
            trailing_comment(field, source)
        } else {
            leading
        };
        let type_text = format::normalize_ws(&node_text(ty_node, source));
        for name in names {
            raw.fields.push(FieldInfo {
                name,
                type_name: type_text.clone(),
                tag: tag.clone(),
                comment: comment.clone(),
            });
        }
    }
}

fn interface_members(
    ctx: &FileContext<'_>,
    ty: Node<'_>,
    source: &str,
    file: &str,
    iface_name: &str,
    raw: &mut RawType,
) {
    let mut cursor = ty.walk();
    for member in ty.named_children(&mut cursor) {
        match member.kind() {
            // method_elem in current grammars, method_spec in older ones
            "method_elem" | "method_spec" => {
                let Some(name_node) = member.child_by_field_name("name") else {
                    continue;
                };
                let name = node_text(name_node, source);
                let (param_groups, canonical_params, variadic) =
                    match member.child_by_field_name("parameters") {
                        Some(list) => ctx.signature_params(list, source),
                        None => (Vec::new(), Vec::new(), false),
                    };
                let (result_groups, canonical_results) = results(ctx, member, source);
                let signature = format::render_signature(
                    &name,
                    Some(("", iface_name)),
                    &param_groups,
                    &result_groups,
                );
                let sig = MethodSig {
                    params: canonical_params,
                    results: canonical_results,
                    variadic,
                };
                raw.iface_methods.push(MethodRecord {
                    name: name.clone(),
                    pointer_recv: false,
                    sig,
                    info: FuncInfo {
                        name,
                        package: ctx.pkg_path.to_string(),
                        receiver: qualified_receiver(ctx.pkg_path, iface_name, false),
                        signature,
                        doc: doc_before(member, source),
                        body: String::new(),
                        is_promoted: false,
                        location: location(name_node, file),
                    },
                });
            }
            "type_elem" => {
                let mut elem_cursor = member.walk();
                let elems: Vec<Node<'_>> = member.named_children(&mut elem_cursor).collect();
                if let [single] = elems.as_slice() {
                    raw.iface_embeds.push(embed_ref(ctx, *single, source, false));
                } else {
                    // Union constraint element: record it verbatim, it never
                    // resolves to a single embedded interface.
                    raw.iface_embeds.push(EmbedRef {
                        display: format::normalize_ws(&node_text(member, source)),
                        pointer: false,
                        target: None,
                    });
                }
            }
            // Older grammars expose embedded interfaces directly.
            "type_identifier" | "qualified_type" | "generic_type" => {
                raw.iface_embeds.push(embed_ref(ctx, member, source, false));
            }
            _ => {}
        }
    }
}

fn value_declaration(
    ctx: &FileContext<'_>,
    decl: Node<'_>,
    source: &str,
    file: &str,
    is_const: bool,
    out: &mut Vec<VarInfo>,
) {
    let spec_kind = if is_const { "const_spec" } else { "var_spec" };
    let mut specs = Vec::new();
    let mut stack = vec![decl];
    while let Some(node) = stack.pop() {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == spec_kind {
                specs.push(child);
            } else if child.kind().ends_with("_spec_list") {
                stack.push(child);
            }
        }
    }
    specs.sort_by_key(|s| s.start_byte());
    let group_doc = doc_before(decl, source);
    let count = specs.len();

    for spec in specs {
        let doc = format::spec_doc(doc_before(spec, source), &group_doc, count);
        let type_text = match spec.child_by_field_name("type") {
            Some(ty) => format::normalize_ws(&node_text(ty, source)),
            None => spec
                .child_by_field_name("value")
                .map(|v| inferred_literal_type(v, source))
                .unwrap_or_default(),
        };
        let mut name_cursor = spec.walk();
        for name_node in spec.children_by_field_name("name", &mut name_cursor) {
            out.push(VarInfo {
                name: node_text(name_node, source),
                package: ctx.pkg_path.to_string(),
                type_name: type_text.clone(),
                is_const,
                doc: doc.clone(),
                location: location(name_node, file),
            });
        }
    }
}

/// Best-effort type inference for untyped declarations: basic literals only.
fn inferred_literal_type(value: Node<'_>, _source: &str) -> String {
    let expr = if value.kind() == "expression_list" {
        match value.named_child(0) {
            Some(first) => first,
            None => return String::new(),
        }
    } else {
        value
    };
    match expr.kind() {
        "int_literal" => "int",
        "float_literal" => "float64",
        "interpreted_string_literal" | "raw_string_literal" => "string",
        "rune_literal" => "rune",
        "true" | "false" => "bool",
        _ => "",
    }
    .to_string()
}
