use notebot_core::db::open_db_in_memory;
use notebot_core::{NoteRepository, RepoError, SqliteNoteRepository};
use rusqlite::Connection;

const OWNER: i64 = 42;

#[test]
fn add_then_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let id = repo.add_note(OWNER, "buy milk").unwrap();
    assert_eq!(id, 1);

    let note = repo.get_note(OWNER, id).unwrap().unwrap();
    assert_eq!(note.id, id);
    assert_eq!(note.owner_id, OWNER);
    assert_eq!(note.text, "buy milk");
    assert!(note.created_at > 0);
}

#[test]
fn add_rejects_empty_and_whitespace_only_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let err = repo.add_note(OWNER, "").unwrap_err();
    assert!(matches!(err, RepoError::InvalidInput(_)));

    let err = repo.add_note(OWNER, "   \n\t ").unwrap_err();
    assert!(matches!(err, RepoError::InvalidInput(_)));

    assert_eq!(repo.count_notes(OWNER).unwrap(), 0);
}

#[test]
fn add_stores_trimmed_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let id = repo.add_note(OWNER, "  padded  ").unwrap();
    let note = repo.get_note(OWNER, id).unwrap().unwrap();
    assert_eq!(note.text, "padded");
}

#[test]
fn update_then_get_reflects_new_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let id = repo.add_note(OWNER, "buy milk").unwrap();
    assert!(repo.update_note(OWNER, id, "buy oat milk").unwrap());

    let note = repo.get_note(OWNER, id).unwrap().unwrap();
    assert_eq!(note.text, "buy oat milk");
}

#[test]
fn update_missing_note_returns_false() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    assert!(!repo.update_note(OWNER, 9999, "nothing there").unwrap());
}

#[test]
fn update_rejects_empty_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let id = repo.add_note(OWNER, "keep me").unwrap();
    let err = repo.update_note(OWNER, id, "  ").unwrap_err();
    assert!(matches!(err, RepoError::InvalidInput(_)));

    let note = repo.get_note(OWNER, id).unwrap().unwrap();
    assert_eq!(note.text, "keep me");
}

#[test]
fn delete_then_get_returns_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let id = repo.add_note(OWNER, "short lived").unwrap();
    assert!(repo.delete_note(OWNER, id).unwrap());
    assert!(repo.get_note(OWNER, id).unwrap().is_none());

    // Second delete is a clean not-found, not an error.
    assert!(!repo.delete_note(OWNER, id).unwrap());
}

#[test]
fn list_returns_newest_first_and_honors_limit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let first = repo.add_note(OWNER, "first").unwrap();
    let second = repo.add_note(OWNER, "second").unwrap();
    let third = repo.add_note(OWNER, "third").unwrap();

    let all = repo.list_notes(OWNER, None).unwrap();
    let ids: Vec<i64> = all.iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![third, second, first]);

    let page = repo.list_notes(OWNER, Some(2)).unwrap();
    let ids: Vec<i64> = page.iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![third, second]);
}

#[test]
fn find_matches_substring_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    repo.add_note(OWNER, "buy milk").unwrap();
    repo.add_note(OWNER, "call dentist").unwrap();
    let oat = repo.add_note(OWNER, "buy oat milk").unwrap();

    let hits = repo.find_notes(OWNER, "milk", None).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, oat, "newest match comes first");
}

#[test]
fn find_with_empty_query_matches_every_note() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    repo.add_note(OWNER, "one").unwrap();
    repo.add_note(OWNER, "two").unwrap();

    let hits = repo.find_notes(OWNER, "", None).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn find_treats_like_metacharacters_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let discount = repo.add_note(OWNER, "50% discount").unwrap();
    repo.add_note(OWNER, "500 dollars").unwrap();

    let hits = repo.find_notes(OWNER, "50%", None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, discount);

    let underscore = repo.add_note(OWNER, "snake_case").unwrap();
    repo.add_note(OWNER, "snakeXcase").unwrap();

    let hits = repo.find_notes(OWNER, "snake_", None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, underscore);
}

#[test]
fn count_tracks_adds_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    assert_eq!(repo.count_notes(OWNER).unwrap(), 0);
    let id = repo.add_note(OWNER, "one").unwrap();
    repo.add_note(OWNER, "two").unwrap();
    assert_eq!(repo.count_notes(OWNER).unwrap(), 2);

    repo.delete_note(OWNER, id).unwrap();
    assert_eq!(repo.count_notes(OWNER).unwrap(), 1);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteNoteRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_notes_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        notebot_core::db::migrations::latest_version()
    ))
    .unwrap();

    let result = SqliteNoteRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("notes"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_notes_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            text TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        notebot_core::db::migrations::latest_version()
    ))
    .unwrap();

    let result = SqliteNoteRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "notes",
            column: "created_at"
        })
    ));
}
