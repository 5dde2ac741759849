use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Note {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub branch: Option<String>,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: Option<String>,
    pub size_bytes: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub struct NoteSummary {
    pub id: i64,
    pub title: String,
    pub branch: Option<String>,
    pub owner: String,
    pub download_count: i64,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewNote {
    pub user_id: String,
    pub title: String,
    pub branch: Option<String>,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: Option<String>,
    pub size_bytes: i64,
}

#[derive(Debug)]
pub struct NoteFilter {
    pub branch: Option<String>,
    pub owner: Option<String>,
    pub limit: i64,
}
