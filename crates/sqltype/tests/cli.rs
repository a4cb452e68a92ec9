//! CLI file round trips
//!
//! Covers:
//! - checking a JSON expression tree read from disk
//! - session configuration files and flag overrides
//! - span resolution against the statement text

#![cfg(feature = "cli")]

use pretty_assertions::assert_eq;
use sqltype::Tree;
use sqltype::ast::{Expression, Operator};
use sqltype::cli::SessionFlags;
use sqltype::cli::check::check_file;
use sqltype::diagnostics::Span;
use sqltype::types::{CompatMode, SessionConfig, TypeTag, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_tree(dir: &TempDir, expr: &Expression) -> PathBuf {
    write(dir, "tree.json", &serde_json::to_string(expr).unwrap())
}

fn checked_expression(tree: Tree) -> Expression {
    match tree {
        Tree::Expression(expr) => expr,
        Tree::Query(_) => panic!("expression expected"),
    }
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_check_file_folds_expression() {
    let dir = TempDir::new().unwrap();
    let expr = Expression::binary(Operator::Plus, Expression::varchar("3"), Expression::integer(5));
    let path = write_tree(&dir, &expr);

    let config = SessionConfig::default().with_plus_as_concat(false);
    let report = check_file(&path, None, config).unwrap();

    assert!(report.diagnostics.is_empty());
    let expr = checked_expression(report.tree);
    assert_eq!(expr.type_tag, TypeTag::Double);
    assert_eq!(expr.value(), Some(&Value::Double(8.0)));
}

#[test]
fn test_check_file_reports_located_error() {
    let dir = TempDir::new().unwrap();
    let source = "SELECT ABS(1, 2)";
    let expr = Expression::binary(Operator::Abs, Expression::integer(1), Expression::integer(2))
        .with_span(Span::new(7, 16));
    let tree = write_tree(&dir, &expr);
    let statement = write(&dir, "statement.sql", source);

    let report = check_file(&tree, Some(&statement), SessionConfig::default()).unwrap();

    assert_eq!(report.diagnostics.error_count(), 1);
    let diagnostic = report.diagnostics.iter().next().unwrap();
    assert!(diagnostic.location.is_some());
    assert_eq!(checked_expression(report.tree).type_tag, TypeTag::None);
}

#[test]
fn test_invalid_tree_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "tree.json", "{\"node\": \"nothing\"}");
    assert!(check_file(&path, None, SessionConfig::default()).is_err());
}

#[test]
fn test_missing_tree_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    assert!(check_file(&path, None, SessionConfig::default()).is_err());
}

// ============================================================================
// Session configuration
// ============================================================================

#[test]
fn test_config_file_is_loaded_and_flags_override_it() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "session.json", r#"{"plus_as_concat": false, "no_fold": false}"#);
    let flags = SessionFlags {
        config: Some(config),
        mysql: true,
        no_fold: true,
        ..SessionFlags::default()
    };

    let session = flags.session_config().unwrap();
    assert!(!session.plus_as_concat);
    assert!(session.no_fold);
    assert_eq!(session.compat_mode, CompatMode::Mysql);
}

#[test]
fn test_plus_as_concat_flag_wins_over_file() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "session.json", r#"{"plus_as_concat": false}"#);
    let flags = SessionFlags {
        config: Some(config),
        plus_as_concat: Some(true),
        ..SessionFlags::default()
    };
    assert!(flags.session_config().unwrap().plus_as_concat);
}

#[test]
fn test_broken_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "session.json", "{ not json");
    let flags = SessionFlags {
        config: Some(config),
        ..SessionFlags::default()
    };
    assert!(flags.session_config().is_err());
}
