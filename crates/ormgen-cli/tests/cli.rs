//! Integration tests for the ormgen binary

use assert_cmd::Command;
use predicates::prelude::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn ormgen(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ormgen"));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

async fn create_sqlite_db(path: &Path) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    for stmt in [
        "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL, age INT UNSIGNED)",
        "CREATE UNIQUE INDEX idx_users_email ON users (email)",
        "CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL, title TEXT NOT NULL)",
        "CREATE INDEX idx_posts_user_id ON posts (user_id)",
    ] {
        sqlx::query(stmt).execute(&pool).await.unwrap();
    }
    pool.close().await;
}

#[test]
fn test_cli_help() {
    let tmp = TempDir::new().unwrap();
    ormgen(tmp.path())
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("-dsn"))
        .stdout(predicate::str::contains("-fieldSignable"));
}

#[test]
fn test_cli_version() {
    let tmp = TempDir::new().unwrap();
    ormgen(tmp.path())
        .arg("-version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ormgen"));
}

#[test]
fn test_empty_dsn_fails_before_connecting() {
    let tmp = TempDir::new().unwrap();
    ormgen(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("dsn cannot be empty"));
}

#[test]
fn test_unknown_driver_is_named() {
    let tmp = TempDir::new().unwrap();
    ormgen(tmp.path())
        .args(["-dsn", "x", "-db", "unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"unknown\""));
}

#[test]
fn test_unknown_flag_is_rejected() {
    let tmp = TempDir::new().unwrap();
    ormgen(tmp.path())
        .arg("-bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("-bogus"));
}

#[test]
fn test_missing_config_file_falls_back_to_flags() {
    let tmp = TempDir::new().unwrap();
    ormgen(tmp.path())
        .args(["-c", "missing.yml", "-dsn", "x", "-db", "unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ignoring config file"))
        .stderr(predicate::str::contains("\"unknown\""));
}

#[tokio::test]
async fn test_generates_from_sqlite_database() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("app.db");
    create_sqlite_db(&db).await;

    fs::write(
        tmp.path().join("gen.yml"),
        format!(
            "version: \"0.1\"\ndatabase:\n  dsn: \"{}\"\n  db: \"sqlite\"\n  fieldNullable: true\n  outPath: \"./dao/query\"\n",
            db.display()
        ),
    )
    .unwrap();

    ormgen(tmp.path())
        .args(["-c", "gen.yml", "-fieldSignable", "-withUnitTest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    let model = fs::read_to_string(tmp.path().join("dao/model/users.rs")).unwrap();
    assert!(model.contains("pub struct Users {"));
    assert!(model.contains("pub age: Option<u32>,"));

    let query = fs::read_to_string(tmp.path().join("dao/query/posts.rs")).unwrap();
    assert!(query.contains("pub async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Posts>, sqlx::Error> {"));
    assert!(query.contains("#[cfg(test)]"));

    let root = fs::read_to_string(tmp.path().join("dao/query/mod.rs")).unwrap();
    assert!(root.contains("pub mod posts;"));
    assert!(root.contains("pub mod users;"));

    ormgen(tmp.path())
        .args(["-c", "gen.yml", "-fieldSignable", "-withUnitTest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[tokio::test]
async fn test_only_model_and_table_filter() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("app.db");
    create_sqlite_db(&db).await;

    ormgen(tmp.path())
        .args(["-db", "sqlite", "-dsn"])
        .arg(&db)
        .args(["-tables", "users", "-onlyModel", "-outPath", "out/query"])
        .assert()
        .success();

    assert!(tmp.path().join("out/model/users.rs").exists());
    assert!(!tmp.path().join("out/model/posts.rs").exists());
    assert!(!tmp.path().join("out/query").exists());
}

#[test]
fn test_missing_sqlite_file_is_a_connection_error() {
    let tmp = TempDir::new().unwrap();
    ormgen(tmp.path())
        .args(["-db", "sqlite", "-dsn", "does-not-exist.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to connect to sqlite database"));
}
