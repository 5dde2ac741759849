use crate::errors::ApiError;
use crate::models::note::{NewNote, Note, NoteFilter, NoteSummary};
use crate::models::user::User;
use sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions, sqlite::SqliteConnectOptions};
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct Db(pub SqlitePool);

impl Db {
    pub async fn connect_and_migrate(path: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(opts).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Db(pool))
    }

    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, ApiError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now();
        let res = sqlx::query(
            "INSERT INTO users(id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .execute(&self.0)
        .await;

        if let Err(e) = res {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.message().contains("UNIQUE") {
                    return Err(ApiError::Conflict("username already exists".into()));
                }
            }
            return Err(e.into());
        }

        Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    pub async fn find_user_by_name(&self, username: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.0)
        .await?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            username: r.get("username"),
            password_hash: r.get("password_hash"),
            created_at: r.get("created_at"),
        }))
    }

    pub async fn create_note(&self, note: &NewNote) -> Result<i64, ApiError> {
        let res = sqlx::query(
            "INSERT INTO notes(user_id, title, branch, original_name, stored_name, mime_type, size_bytes, download_count, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&note.user_id)
        .bind(&note.title)
        .bind(&note.branch)
        .bind(&note.original_name)
        .bind(&note.stored_name)
        .bind(&note.mime_type)
        .bind(note.size_bytes)
        .bind(chrono::Utc::now())
        .execute(&self.0)
        .await?;

        Ok(res.last_insert_rowid())
    }

    pub async fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<NoteSummary>, ApiError> {
        let mut sql = String::from(
            "SELECT n.id, n.title, n.branch, n.download_count, n.size_bytes, n.created_at, u.username
             FROM notes n INNER JOIN users u ON u.id = n.user_id",
        );
        let mut clauses: Vec<&str> = Vec::new();
        if filter.branch.is_some() {
            clauses.push("n.branch = ?");
        }
        if filter.owner.is_some() {
            clauses.push("u.username = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY n.created_at DESC, n.id DESC LIMIT ?");

        let mut q = sqlx::query(&sql);
        if let Some(branch) = &filter.branch {
            q = q.bind(branch);
        }
        if let Some(owner) = &filter.owner {
            q = q.bind(owner);
        }
        let rows = q.bind(filter.limit).fetch_all(&self.0).await?;

        Ok(rows
            .into_iter()
            .map(|r| NoteSummary {
                id: r.get("id"),
                title: r.get("title"),
                branch: r.get("branch"),
                owner: r.get("username"),
                download_count: r.get("download_count"),
                size_bytes: r.get("size_bytes"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    pub async fn get_note(&self, note_id: i64) -> Result<Option<Note>, ApiError> {
        let row = sqlx::query(
            "SELECT id, user_id, title, branch, original_name, stored_name, mime_type, size_bytes, download_count, created_at
             FROM notes WHERE id = ?",
        )
        .bind(note_id)
        .fetch_optional(&self.0)
        .await?;

        Ok(row.map(|r| Note {
            id: r.get("id"),
            user_id: r.get("user_id"),
            title: r.get("title"),
            branch: r.get("branch"),
            original_name: r.get("original_name"),
            stored_name: r.get("stored_name"),
            mime_type: r.get("mime_type"),
            size_bytes: r.get("size_bytes"),
            download_count: r.get("download_count"),
            created_at: r.get("created_at"),
        }))
    }

    // Single UPDATE statement; the database serializes concurrent increments.
    pub async fn increment_download_count(&self, note_id: i64) -> Result<(), ApiError> {
        sqlx::query("UPDATE notes SET download_count = download_count + 1 WHERE id = ?")
            .bind(note_id)
            .execute(&self.0)
            .await?;
        Ok(())
    }
}
