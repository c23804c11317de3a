use thiserror::Error;

#[derive(Error, Debug)]
pub enum GolensError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid root {0:?}: not an existing directory")]
    InvalidRoot(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("package {0:?} not found in index")]
    PackageNotFound(String),
    #[error("function {name:?} not found in package {package:?}")]
    FunctionNotFound { package: String, name: String },
    #[error("type {name:?} not found in package {package:?}")]
    TypeNotFound { package: String, name: String },
    #[error("method {name:?} not found on type {type_name:?} in package {package:?}")]
    MethodNotFound {
        package: String,
        type_name: String,
        name: String,
    },
    #[error("symbol {name:?} not found in package {package:?}")]
    SymbolNotFound { package: String, name: String },
    #[error("{name:?} in package {package:?} is not a type")]
    NotAType { package: String, name: String },
    #[error("{name:?} in package {package:?} is not an interface type")]
    NotAnInterface { package: String, name: String },
    #[error("unknown match mode {0:?}: expected \"exact\", \"prefix\", or \"contains\"")]
    InvalidMatchMode(String),
}

pub type Result<T> = std::result::Result<T, GolensError>;
