//! MCP surface of the symbol index.
//!
//! Each query operation of the core is bound to one callable tool. The
//! server holds the current snapshot behind `Arc<RwLock<Arc<Snapshot>>>`:
//! readers clone the inner `Arc` and query it lock-free, and `reindex`
//! swaps in a freshly built snapshot atomically, so a rebuild is never
//! observable as a torn state.

use golens_core::index::{Indexer, Snapshot};
use golens_core::model::{PackageSymbols, SymbolKind};
use golens_core::query::{Finder, MatchMode};
use rmcp::{
    ErrorData as McpError,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, InitializeResult, ServerCapabilities},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub mod memory;
pub mod stdio;

use memory::MemoryStore;

/// Longest accepted string argument, in bytes. Anything larger is rejected
/// before any lookup runs.
const MAX_INPUT_LEN: usize = 2048;

#[derive(Clone)]
pub struct McpServer {
    tool_router: ToolRouter<Self>,
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
    memory: Arc<MemoryStore>,
}

#[derive(Deserialize, JsonSchema)]
pub struct ListPackagesArgs {
    /// Optional prefix filter on import path
    pub filter: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct PackageSymbolsArgs {
    /// Package import path
    pub package: String,
    /// Include unexported symbols (default: false)
    #[serde(default)]
    pub include_unexported: bool,
    /// Include function bodies in the response (default: false)
    #[serde(default)]
    pub include_bodies: bool,
}

#[derive(Deserialize, JsonSchema)]
pub struct FileSymbolsArgs {
    /// File path, absolute or relative; relative paths match by suffix
    pub file: String,
    /// Include unexported symbols (default: false)
    #[serde(default)]
    pub include_unexported: bool,
    /// Include function bodies in the response (default: false)
    #[serde(default)]
    pub include_bodies: bool,
}

#[derive(Deserialize, JsonSchema)]
pub struct FindSymbolArgs {
    /// Symbol name to search for
    pub name: String,
    /// Filter by kind: func, method, type, var, const (empty = all)
    pub kind: Option<String>,
    /// Match mode: "exact" (default), "prefix", or "contains"
    pub r#match: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct GetFunctionArgs {
    /// Package import path
    pub package: String,
    /// Function name, or TypeName.MethodName for methods
    pub name: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct GetTypeArgs {
    /// Package import path
    pub package: String,
    /// Type name
    pub name: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct FindImplementationsArgs {
    /// Package import path of the interface
    pub package: String,
    /// Interface type name
    pub interface: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct ReindexArgs {}

#[derive(Deserialize, JsonSchema)]
pub struct RememberArgs {
    /// Key the note is stored under
    pub key: String,
    /// Note content
    pub value: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct RecallArgs {
    /// Key of the note to fetch
    pub key: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct ListMemoriesArgs {}

#[derive(Deserialize, JsonSchema)]
pub struct ForgetArgs {
    /// Key of the note to delete
    pub key: String,
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => Err(McpError::new(
            rmcp::model::ErrorCode(-32000),
            e.to_string(),
            None,
        )),
    }
}

fn map_core_err(e: golens_core::error::GolensError) -> McpError {
    use golens_core::error::GolensError;
    match e {
        GolensError::InvalidMatchMode(_) => McpError::invalid_params(e.to_string(), None),
        _ => McpError::new(rmcp::model::ErrorCode(-32000), e.to_string(), None),
    }
}

fn map_memory_err(e: memory::MemoryError) -> McpError {
    McpError::new(rmcp::model::ErrorCode(-32000), e.to_string(), None)
}

/// Rejects oversized string arguments before any work happens.
fn guard_len(fields: &[(&str, &str)]) -> Result<(), McpError> {
    for (field, value) in fields {
        if value.len() > MAX_INPUT_LEN {
            return Err(McpError::invalid_params(
                format!("field {field:?} exceeds maximum length of {MAX_INPUT_LEN} bytes"),
                None,
            ));
        }
    }
    Ok(())
}

fn parse_kind(kind: &str) -> Option<SymbolKind> {
    match kind {
        "func" => Some(SymbolKind::Func),
        "method" => Some(SymbolKind::Method),
        "type" => Some(SymbolKind::Type),
        "var" => Some(SymbolKind::Var),
        "const" => Some(SymbolKind::Const),
        _ => None,
    }
}

fn strip_bodies(symbols: &mut PackageSymbols) {
    for func in &mut symbols.funcs {
        func.body.clear();
    }
    for ty in &mut symbols.types {
        for method in &mut ty.methods {
            method.body.clear();
        }
    }
}

#[tool_router]
impl McpServer {
    pub fn new(snapshot: Snapshot) -> Self {
        let memory = Arc::new(MemoryStore::new(snapshot.root()));
        Self {
            tool_router: Self::tool_router(),
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            memory,
        }
    }

    async fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    #[tool(description = "Lists all indexed packages with summary statistics.")]
    pub async fn list_packages(
        &self,
        params: Parameters<ListPackagesArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        let filter = args.filter.unwrap_or_default();
        guard_len(&[("filter", &filter)])?;
        let snap = self.current().await;
        let finder = Finder::new(&snap);
        let prefix = (!filter.is_empty()).then_some(filter.as_str());
        json_result(&finder.list_packages(prefix))
    }

    #[tool(
        description = "Returns all symbols in a package: functions, types, variables, and constants."
    )]
    pub async fn get_package_symbols(
        &self,
        params: Parameters<PackageSymbolsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        guard_len(&[("package", &args.package)])?;
        let snap = self.current().await;
        let finder = Finder::new(&snap);
        let mut symbols = finder
            .package_symbols(&args.package, args.include_unexported)
            .map_err(map_core_err)?;
        if !args.include_bodies {
            strip_bodies(&mut symbols);
        }
        json_result(&symbols)
    }

    #[tool(description = "Returns all symbols defined in the given source file.")]
    pub async fn get_file_symbols(
        &self,
        params: Parameters<FileSymbolsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        guard_len(&[("file", &args.file)])?;
        let snap = self.current().await;
        let finder = Finder::new(&snap);
        let mut symbols = finder.file_symbols(&args.file, args.include_unexported);
        if !args.include_bodies {
            strip_bodies(&mut symbols);
        }
        json_result(&symbols)
    }

    #[tool(description = "Searches for a symbol by name across the entire indexed codebase.")]
    pub async fn find_symbol(
        &self,
        params: Parameters<FindSymbolArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        let kind = args.kind.unwrap_or_default();
        let mode = args.r#match.unwrap_or_else(|| "exact".to_string());
        guard_len(&[("name", &args.name), ("kind", &kind), ("match", &mode)])?;
        let mode: MatchMode = mode.parse().map_err(map_core_err)?;
        let snap = self.current().await;
        let finder = Finder::new(&snap);
        if kind.is_empty() {
            return json_result(&finder.find_symbol(&args.name, None, mode));
        }
        // An unknown kind matches nothing, mirroring a plain string filter.
        let refs = match parse_kind(&kind) {
            Some(kind) => finder.find_symbol(&args.name, Some(kind), mode),
            None => Vec::new(),
        };
        json_result(&refs)
    }

    #[tool(description = "Returns full details for a specific function or method.")]
    pub async fn get_function(
        &self,
        params: Parameters<GetFunctionArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        guard_len(&[("package", &args.package), ("name", &args.name)])?;
        let snap = self.current().await;
        let finder = Finder::new(&snap);
        let func = finder
            .function(&args.package, &args.name)
            .map_err(map_core_err)?;
        json_result(&func)
    }

    #[tool(description = "Returns the full definition of a type (struct or interface).")]
    pub async fn get_type(
        &self,
        params: Parameters<GetTypeArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        guard_len(&[("package", &args.package), ("name", &args.name)])?;
        let snap = self.current().await;
        let finder = Finder::new(&snap);
        let ty = finder
            .type_info(&args.package, &args.name)
            .map_err(map_core_err)?;
        json_result(&ty)
    }

    #[tool(
        description = "Finds all concrete types in the indexed codebase that implement a given interface, with the satisfying form (value or pointer) for each."
    )]
    pub async fn find_implementations(
        &self,
        params: Parameters<FindImplementationsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        guard_len(&[("package", &args.package), ("interface", &args.interface)])?;
        let snap = self.current().await;
        let finder = Finder::new(&snap);
        let impls = finder
            .implementations(&args.package, &args.interface)
            .map_err(map_core_err)?;
        json_result(&impls)
    }

    #[tool(
        description = "Rebuilds the symbol index from scratch and atomically replaces the served snapshot."
    )]
    pub async fn reindex(
        &self,
        _params: Parameters<ReindexArgs>,
    ) -> Result<CallToolResult, McpError> {
        let root = self.current().await.root().to_path_buf();
        let fresh = tokio::task::spawn_blocking(move || {
            let indexer = Indexer::new(&root)?;
            indexer.index()
        })
        .await
        .map_err(|e| McpError::new(rmcp::model::ErrorCode(-32000), e.to_string(), None))?
        .map_err(map_core_err)?;

        let packages = fresh.packages().len();
        *self.snapshot.write().await = Arc::new(fresh);
        info!(packages, "index rebuilt");
        json_result(&serde_json::json!({ "status": "ok", "packages": packages }))
    }

    #[tool(description = "Stores a persistent note under a key for later sessions.")]
    pub async fn remember(
        &self,
        params: Parameters<RememberArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        guard_len(&[("key", &args.key), ("value", &args.value)])?;
        self.memory
            .write(&args.key, &args.value)
            .map_err(map_memory_err)?;
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }

    #[tool(description = "Fetches a previously stored note by key.")]
    pub async fn recall(
        &self,
        params: Parameters<RecallArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        guard_len(&[("key", &args.key)])?;
        let value = self.memory.read(&args.key).map_err(map_memory_err)?;
        Ok(CallToolResult::success(vec![Content::text(value)]))
    }

    #[tool(description = "Lists all stored notes.")]
    pub async fn list_memories(
        &self,
        _params: Parameters<ListMemoriesArgs>,
    ) -> Result<CallToolResult, McpError> {
        let entries = self.memory.entries().map_err(map_memory_err)?;
        json_result(&entries)
    }

    #[tool(description = "Deletes a stored note by key.")]
    pub async fn forget(
        &self,
        params: Parameters<ForgetArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        guard_len(&[("key", &args.key)])?;
        self.memory.delete(&args.key).map_err(map_memory_err)?;
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for McpServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: rmcp::model::ProtocolVersion::V_2024_11_05,
            server_info: Implementation {
                name: "golens".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
