mod common;

use common::{write_fixture, GREETER_PKG, SHAPES_PKG};
use golens_core::error::GolensError;
use golens_core::index::{Indexer, Snapshot};
use golens_core::model::{Satisfaction, SymbolKind};
use golens_core::query::{Finder, MatchMode};
use tempfile::tempdir;

fn build(dir: &tempfile::TempDir) -> Snapshot {
    write_fixture(dir.path());
    Indexer::new(dir.path())
        .expect("indexer")
        .index()
        .expect("index")
}

#[test]
fn find_symbol_modes_and_kinds() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    let new_fn = finder.find_symbol("New", None, MatchMode::Exact);
    assert_eq!(new_fn.len(), 1);
    assert_eq!(new_fn[0].kind, SymbolKind::Func);
    assert!(new_fn[0].signature.starts_with("func New("));
    assert!(new_fn[0].receiver.is_empty());

    // One hit per declaring or promoting type, plus the interface methods.
    let greets = finder.find_symbol("Greet", None, MatchMode::Exact);
    assert_eq!(greets.len(), 5);
    let expected_receivers = [
        format!("*{GREETER_PKG}.English"),
        format!("{GREETER_PKG}.Formal"),
        format!("{GREETER_PKG}.Greeter"),
        format!("{SHAPES_PKG}.Loud"),
    ];
    for hit in &greets {
        assert_eq!(hit.kind, SymbolKind::Method);
        assert!(
            expected_receivers.contains(&hit.receiver),
            "unexpected receiver {}",
            hit.receiver
        );
    }

    let consts = finder.find_symbol("DefaultPrefix", None, MatchMode::Exact);
    assert_eq!(consts.len(), 1);
    assert_eq!(consts[0].kind, SymbolKind::Const);

    let vars = finder.find_symbol("MaxLength", None, MatchMode::Exact);
    assert_eq!(vars.len(), 1);
    assert_eq!(vars[0].kind, SymbolKind::Var);

    let by_prefix = finder.find_symbol("Engl", None, MatchMode::Prefix);
    assert_eq!(by_prefix.len(), 1);
    assert_eq!(by_prefix[0].kind, SymbolKind::Type);

    let by_substring = finder.find_symbol("Length", None, MatchMode::Contains);
    assert_eq!(by_substring.len(), 1);
    assert_eq!(by_substring[0].name, "MaxLength");

    assert!(finder
        .find_symbol("ThisSymbolDefinitelyDoesNotExist", None, MatchMode::Exact)
        .is_empty());

    // Kind filter narrows the same query.
    assert_eq!(
        finder
            .find_symbol("Greet", Some(SymbolKind::Method), MatchMode::Exact)
            .len(),
        5
    );
    assert!(finder
        .find_symbol("Greet", Some(SymbolKind::Type), MatchMode::Exact)
        .is_empty());
}

#[test]
fn match_mode_parsing() {
    assert_eq!("exact".parse::<MatchMode>().unwrap(), MatchMode::Exact);
    assert_eq!("prefix".parse::<MatchMode>().unwrap(), MatchMode::Prefix);
    assert_eq!("contains".parse::<MatchMode>().unwrap(), MatchMode::Contains);
    match "fuzzy".parse::<MatchMode>() {
        Err(GolensError::InvalidMatchMode(mode)) => assert_eq!(mode, "fuzzy"),
        other => panic!("expected InvalidMatchMode, got {other:?}"),
    }
}

#[test]
fn get_function_resolves_methods_and_errors() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    let new_fn = finder.function(GREETER_PKG, "New").expect("New");
    assert_eq!(new_fn.signature, "func New(prefix string) *English");

    let greet = finder.function(GREETER_PKG, "English.Greet").expect("English.Greet");
    assert_eq!(greet.signature, "func (e *English) Greet(name string) string");

    // Promoted methods resolve through the embedding type.
    let promoted = finder
        .function(GREETER_PKG, "FormalEnglish.Greet")
        .expect("FormalEnglish.Greet");
    assert!(promoted.is_promoted);

    let vendored = finder.function(GREETER_PKG, "Lockable.Lock").expect("Lockable.Lock");
    assert!(vendored.is_promoted);
    assert_eq!(vendored.package, GREETER_PKG);

    match finder.function("no/such/package", "New") {
        Err(GolensError::PackageNotFound(pkg)) => assert_eq!(pkg, "no/such/package"),
        other => panic!("expected PackageNotFound, got {other:?}"),
    }
    match finder.function(GREETER_PKG, "Missing.Greet") {
        Err(GolensError::TypeNotFound { name, .. }) => assert_eq!(name, "Missing"),
        other => panic!("expected TypeNotFound, got {other:?}"),
    }
    match finder.function(GREETER_PKG, "English.Missing") {
        Err(GolensError::MethodNotFound { type_name, name, .. }) => {
            assert_eq!(type_name, "English");
            assert_eq!(name, "Missing");
        }
        other => panic!("expected MethodNotFound, got {other:?}"),
    }
    match finder.function(GREETER_PKG, "missingFunc") {
        Err(GolensError::FunctionNotFound { name, .. }) => assert_eq!(name, "missingFunc"),
        other => panic!("expected FunctionNotFound, got {other:?}"),
    }
}

#[test]
fn get_type_and_errors() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    let english = finder.type_info(GREETER_PKG, "English").expect("English");
    assert_eq!(english.name, "English");
    assert_eq!(english.package, GREETER_PKG);

    match finder.type_info(GREETER_PKG, "Nope") {
        Err(GolensError::TypeNotFound { name, .. }) => assert_eq!(name, "Nope"),
        other => panic!("expected TypeNotFound, got {other:?}"),
    }
    match finder.type_info("no/such/package", "English") {
        Err(GolensError::PackageNotFound(_)) => {}
        other => panic!("expected PackageNotFound, got {other:?}"),
    }
}

#[test]
fn package_symbols_respects_visibility() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    let exported = finder.package_symbols(GREETER_PKG, false).expect("symbols");
    assert!(exported.funcs.iter().all(|f| f.name != "hidden"));
    assert!(exported.types.iter().all(|t| t.name != "secret"));
    assert!(exported.vars.iter().all(|v| v.name != "internalCount"));
    assert_eq!(exported.funcs.len(), 6);

    let all = finder.package_symbols(GREETER_PKG, true).expect("symbols");
    assert_eq!(all.funcs.len(), 7);
    assert!(all.types.iter().any(|t| t.name == "secret"));
    assert!(all.vars.iter().any(|v| v.name == "internalCount"));

    match finder.package_symbols("no/such/package", true) {
        Err(GolensError::PackageNotFound(_)) => {}
        other => panic!("expected PackageNotFound, got {other:?}"),
    }
}

#[test]
fn file_symbols_by_absolute_and_suffix() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    let pkg = &snapshot.packages()[GREETER_PKG];
    let absolute = pkg.files[0].clone();
    let by_abs = finder.file_symbols(&absolute, true);
    assert_eq!(by_abs.funcs.len(), 7);
    assert_eq!(by_abs.types.len(), 9);

    let by_suffix = finder.file_symbols("greeter/greeter.go", true);
    assert_eq!(by_suffix.funcs.len(), by_abs.funcs.len());

    let no_match = finder.file_symbols("nope.go", true);
    assert!(no_match.funcs.is_empty());
    assert!(no_match.types.is_empty());
    assert!(no_match.vars.is_empty());
}

#[test]
fn list_packages_with_prefix() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    let all = finder.list_packages(None);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].import_path, GREETER_PKG);
    assert_eq!(all[0].file_count, 1);
    assert_eq!(all[0].func_count, 7);

    let filtered = finder.list_packages(Some("example.com/demo/sh"));
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].import_path, SHAPES_PKG);

    assert!(finder.list_packages(Some("other.org/")).is_empty());
}

#[test]
fn finds_implementations_with_satisfaction_form() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    let impls = finder.implementations(GREETER_PKG, "Greeter").expect("impls");
    let got: Vec<(&str, Satisfaction)> = impls
        .iter()
        .map(|i| (i.type_info.name.as_str(), i.satisfies))
        .collect();
    assert_eq!(
        got,
        [
            ("English", Satisfaction::Pointer),
            ("Formal", Satisfaction::Value),
            ("FormalEnglish", Satisfaction::Value),
            ("Salutation", Satisfaction::Value),
            ("Loud", Satisfaction::Value),
        ]
    );
}

#[test]
fn embedded_interfaces_extend_the_contract() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    let runners = finder.implementations(SHAPES_PKG, "Runner").expect("impls");
    assert_eq!(runners.len(), 1);
    assert_eq!(runners[0].type_info.name, "Robot");
    assert_eq!(runners[0].satisfies, Satisfaction::Pointer);

    let walkers = finder.implementations(SHAPES_PKG, "Walker").expect("impls");
    assert_eq!(walkers.len(), 1);
    assert_eq!(walkers[0].type_info.name, "Robot");
}

#[test]
fn implementations_error_taxonomy() {
    let dir = tempdir().expect("tempdir");
    let snapshot = build(&dir);
    let finder = Finder::new(&snapshot);

    match finder.implementations("no/such/package", "Greeter") {
        Err(GolensError::PackageNotFound(_)) => {}
        other => panic!("expected PackageNotFound, got {other:?}"),
    }
    match finder.implementations(GREETER_PKG, "NoSuchSymbol") {
        Err(GolensError::SymbolNotFound { name, .. }) => assert_eq!(name, "NoSuchSymbol"),
        other => panic!("expected SymbolNotFound, got {other:?}"),
    }
    match finder.implementations(GREETER_PKG, "New") {
        Err(GolensError::NotAType { name, .. }) => assert_eq!(name, "New"),
        other => panic!("expected NotAType, got {other:?}"),
    }
    match finder.implementations(GREETER_PKG, "English") {
        Err(GolensError::NotAnInterface { name, .. }) => assert_eq!(name, "English"),
        other => panic!("expected NotAnInterface, got {other:?}"),
    }
    match finder.implementations(GREETER_PKG, "Salutation") {
        Err(GolensError::NotAnInterface { .. }) => {}
        other => panic!("expected NotAnInterface, got {other:?}"),
    }
}
