//! Unit tests for the TaskaDeck cookie jar database (connection + migrations).

use taskadeck::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use taskadeck::database::Database;
use taskadeck::types::cookie::StoredCookie;
use tempfile::TempDir;

fn cookie(name: &str, domain: &str, raw: &str) -> StoredCookie {
    StoredCookie {
        name: name.to_string(),
        domain: domain.to_string(),
        path: "/".to_string(),
        raw: raw.to_string(),
    }
}

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_cookie_table_and_index() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for (kind, name) in [("table", "cookies"), ("index", "idx_cookies_domain")] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type=?1 AND name=?2",
                [kind, name],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "{} '{}' should exist after migrations", kind, name);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_empty_jar_loads_nothing() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.load_cookies().unwrap().is_empty());
}

#[test]
fn test_replace_cookies_overwrites_previous_contents() {
    let db = Database::open_in_memory().unwrap();
    db.replace_cookies(&[cookie("sid", "a.example", "sid=1"), cookie("pref", "b.example", "pref=x")])
        .unwrap();
    db.replace_cookies(&[cookie("sid", "a.example", "sid=2")]).unwrap();

    let loaded = db.load_cookies().unwrap();
    assert_eq!(loaded, vec![cookie("sid", "a.example", "sid=2")]);
}

#[test]
fn test_load_cookies_orders_by_domain() {
    let db = Database::open_in_memory().unwrap();
    db.replace_cookies(&[cookie("z", "z.example", "z=1"), cookie("a", "a.example", "a=1")])
        .unwrap();

    let domains: Vec<String> = db.load_cookies().unwrap().into_iter().map(|c| c.domain).collect();
    assert_eq!(domains, vec!["a.example", "z.example"]);
}

#[test]
fn test_reopen_keeps_cookies_and_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Cookies.db");
    {
        let db = Database::open(&path).unwrap();
        db.replace_cookies(&[cookie("sid", "site.example", "sid=abc")]).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.load_cookies().unwrap().len(), 1);
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}
