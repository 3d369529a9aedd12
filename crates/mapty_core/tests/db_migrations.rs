use mapty_core::db::migrations::{apply_migrations, latest_version};
use mapty_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, ErrorCode};

const JAN_2020_MS: i64 = 1_577_836_800_000;

#[test]
fn fresh_database_gets_kv_entries_columns() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(
        column_names(&conn, "kv_entries"),
        vec!["key", "value", "updated_at"]
    );
}

#[test]
fn updated_at_defaults_to_epoch_millis() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, ?2);",
        params!["workouts", "[]"],
    )
    .unwrap();

    let updated_at: i64 = conn
        .query_row(
            "SELECT updated_at FROM kv_entries WHERE key = 'workouts';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(updated_at > JAN_2020_MS, "updated_at={updated_at}");
    assert_eq!(updated_at % 1000, 0);
}

#[test]
fn key_is_unique() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('workouts', '[]');",
        [],
    )
    .unwrap();

    let err = conn
        .execute(
            "INSERT INTO kv_entries (key, value) VALUES ('workouts', '[1]');",
            [],
        )
        .unwrap_err();
    assert_eq!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation));
}

#[test]
fn reopening_keeps_entries_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mapty.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES ('workouts', '[]');",
            [],
        )
        .unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn plain_sqlite_file_is_upgraded_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE unrelated (id INTEGER);")
        .unwrap();

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(column_names(&conn, "unrelated"), vec!["id"]);
    assert_eq!(column_names(&conn, "kv_entries").len(), 3);
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 7;")
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 7);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn user_version(conn: &Connection) -> u32 {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap()
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid;")
        .unwrap();
    stmt.query_map([table], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}
