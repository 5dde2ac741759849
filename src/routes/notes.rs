use crate::models::note::{NewNote, NoteFilter, NoteSummary};
use crate::storage::FileStore;
use crate::{config::Config, db::Db, errors::ApiError};
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::TryStreamExt as _;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ListQuery {
    pub branch: Option<String>,
    pub owner: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
struct NotesResp {
    notes: Vec<NoteSummary>,
}

pub async fn list_notes(
    db: web::Data<Db>,
    q: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    if matches!(&q.branch, Some(b) if b.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "branch filter must not be empty".into(),
        ));
    }
    if matches!(&q.owner, Some(o) if o.trim().is_empty()) {
        return Err(ApiError::BadRequest("owner filter must not be empty".into()));
    }

    let filter = NoteFilter {
        branch: q.branch.clone(),
        owner: q.owner.clone(),
        limit: q.limit.unwrap_or(50).clamp(1, 200),
    };
    let notes = db.list_notes(&filter).await?;
    Ok(HttpResponse::Ok().json(NotesResp { notes }))
}

#[derive(Serialize)]
struct UploadResp {
    message: String,
    note_id: i64,
}

pub async fn upload(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    store: web::Data<FileStore>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut username: Option<String> = None;
    let mut title: Option<String> = None;
    let mut branch: Option<String> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|_| ApiError::BadRequest("invalid multipart".into()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|s| s.to_string()))
                    .unwrap_or_else(|| "upload.bin".into());
                let data = read_bytes(&mut field, cfg.max_upload_size).await?;
                file = Some((original, data));
            }
            "username" => username = Some(read_text(&mut field, cfg.max_upload_size).await?),
            "title" => title = Some(read_text(&mut field, cfg.max_upload_size).await?),
            "branch" => branch = Some(read_text(&mut field, cfg.max_upload_size).await?),
            _ => {
                // drain unknown fields so the stream keeps advancing
                while field
                    .try_next()
                    .await
                    .map_err(|_| ApiError::BadRequest("invalid multipart".into()))?
                    .is_some()
                {}
            }
        }
    }

    let (original, data) = file.ok_or(ApiError::MissingFile)?;
    let username = username
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("username field required".into()))?;
    let owner = db
        .find_user_by_name(username.trim())
        .await?
        .ok_or_else(|| ApiError::BadRequest("unknown user".into()))?;

    let blob = store.save(&original, &data)?;
    let note = NewNote {
        user_id: owner.id,
        title: title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| blob.original_name.clone()),
        branch: branch.filter(|b| !b.trim().is_empty()),
        original_name: blob.original_name.clone(),
        stored_name: blob.stored_name.clone(),
        mime_type: blob.mime_type.clone(),
        size_bytes: blob.size_bytes,
    };

    let note_id = match db.create_note(&note).await {
        Ok(id) => id,
        Err(e) => {
            // the blob must not outlive a failed metadata insert
            store.remove(&blob.stored_name);
            return Err(e);
        }
    };

    Ok(HttpResponse::Created().json(UploadResp {
        message: "file uploaded".into(),
        note_id,
    }))
}

pub async fn download(
    db: web::Data<Db>,
    store: web::Data<FileStore>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let note_id = path.into_inner();
    let note = db.get_note(note_id).await?.ok_or(ApiError::NotFound)?;
    let blob_path = store.open(&note.stored_name)?;

    // the counter records attempts initiated: it is bumped before the bytes
    // go out, and a client hanging up mid-stream does not undo it
    db.increment_download_count(note.id).await?;

    let named = actix_files::NamedFile::open_async(blob_path)
        .await
        .map_err(|_| ApiError::Internal)?
        .use_last_modified(true)
        .prefer_utf8(true)
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(note.original_name.clone())],
        });

    let mut resp = named.into_response(&req);
    if let Some(m) = note.mime_type {
        if let Ok(val) = actix_web::http::header::HeaderValue::from_str(&m) {
            resp.headers_mut()
                .insert(actix_web::http::header::CONTENT_TYPE, val);
        }
    }
    Ok(resp)
}

async fn read_bytes(field: &mut actix_multipart::Field, max: usize) -> Result<Vec<u8>, ApiError> {
    let mut data: Vec<u8> = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|_| ApiError::BadRequest("upload read error".into()))?
    {
        data.extend_from_slice(&chunk);
        if data.len() > max {
            return Err(ApiError::BadRequest("file too large".into()));
        }
    }
    Ok(data)
}

async fn read_text(field: &mut actix_multipart::Field, max: usize) -> Result<String, ApiError> {
    let data = read_bytes(field, max).await?;
    String::from_utf8(data).map_err(|_| ApiError::BadRequest("field must be utf-8".into()))
}
