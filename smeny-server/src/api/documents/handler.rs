//! Document API Handlers
//!
//! Uploads arrive as multipart with a `file` field plus optional `name`,
//! `description` and `user_id` (a company uploading for one of its workers).

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Document, UserRole};
use shared::util::{now_millis, snowflake_id};

use crate::api::{ApiResult, check_access, missing};
use crate::auth::{Action, CurrentUser, ResourceKind};
use crate::db::{self, Scope};
use crate::error::ServiceError;
use crate::services::StorageError;
use crate::services::storage::MAX_FILE_SIZE;
use crate::state::AppState;
use crate::util::normalize_optional;

const MAX_NAME_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 1000;

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Empty => AppError::new(ErrorCode::EmptyFile),
            StorageError::TooLarge => AppError::new(ErrorCode::FileTooLarge)
                .with_detail("max_bytes", MAX_FILE_SIZE as u64),
            StorageError::UnsupportedFormat(ext) => {
                AppError::new(ErrorCode::UnsupportedFileFormat).with_detail("extension", ext)
            }
            StorageError::InvalidKey(_) | StorageError::Io(_) => {
                tracing::error!(error = %e, "Document storage failure");
                AppError::new(ErrorCode::FileStorageFailed)
            }
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        ServiceError::App(e.into())
    }
}

#[derive(Default)]
struct UploadForm {
    file_name: Option<String>,
    data: Option<Vec<u8>>,
    name: Option<String>,
    description: Option<String>,
    user_id: Option<i64>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        AppError::new(ErrorCode::FileTooLarge)
                    } else {
                        AppError::validation(format!("Multipart error: {e}"))
                    }
                })?;
                form.data = Some(bytes.to_vec());
            }
            "name" | "description" | "user_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?;
                match field_name.as_str() {
                    "name" => form.name = normalize_optional(Some(text)),
                    "description" => form.description = normalize_optional(Some(text)),
                    _ => {
                        let text = text.trim();
                        if !text.is_empty() {
                            form.user_id = Some(text.parse().map_err(|_| {
                                AppError::validation("user_id must be a number")
                            })?);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Owner of an upload: the caller, or a user the caller manages
async fn upload_owner(
    state: &AppState,
    user: &CurrentUser,
    requested: Option<i64>,
) -> Result<i64, ServiceError> {
    let Some(target) = requested.filter(|id| *id != user.id()) else {
        return Ok(user.id());
    };
    let found = match user.role() {
        UserRole::Admin => db::users::find_by_id(&state.pool, target).await?.is_some(),
        UserRole::Company => db::users::find_worker(&state.pool, target, Some(user.id()))
            .await?
            .is_some(),
        UserRole::Worker => {
            return Err(AppError::permission_denied("Workers upload only for themselves").into());
        }
    };
    if !found {
        return Err(missing(ErrorCode::WorkerNotFound, target).into());
    }
    Ok(target)
}

/// ASCII-only file name for `Content-Disposition`
fn disposition_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim().is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Document>> {
    Ok(Json(
        db::documents::list(&state.pool, Scope::of(&user.user)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Document> {
    check_access(&state, &user, ResourceKind::Document, id, Action::Read).await?;
    let doc = db::documents::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::DocumentNotFound, id))?;
    Ok(Json(doc))
}

pub async fn upload(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<Document> {
    let form = read_form(multipart).await?;
    let data = form
        .data
        .ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    let original_name = form
        .file_name
        .and_then(|n| normalize_optional(Some(n)))
        .ok_or_else(|| AppError::validation("File name is missing"))?;
    if original_name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation("File name is too long").into());
    }
    if form
        .description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
    {
        return Err(AppError::validation("Description is too long").into());
    }
    let owner_id = upload_owner(&state, &user, form.user_id).await?;

    let stored = state.storage.save(&original_name, &data).await?;

    let doc = Document {
        id: snowflake_id(),
        user_id: owner_id,
        name: form
            .name
            .filter(|n| n.chars().count() <= MAX_NAME_LEN)
            .unwrap_or_else(|| original_name.clone()),
        original_name,
        mime_type: stored.mime_type,
        size_bytes: stored.size_bytes,
        sha256: stored.sha256,
        storage_key: stored.storage_key,
        description: form.description,
        created_at: now_millis(),
    };

    if let Err(e) = db::documents::create(&state.pool, &doc).await {
        if let Err(cleanup) = state.storage.delete(&doc.storage_key).await {
            tracing::warn!(storage_key = %doc.storage_key, error = %cleanup, "Orphaned document file");
        }
        return Err(e.into());
    }

    tracing::info!(
        document_id = doc.id,
        owner_id,
        size = doc.size_bytes,
        mime = %doc.mime_type,
        "Document uploaded"
    );
    Ok(Json(doc))
}

/// File contents with the stored content type
pub async fn download(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    check_access(&state, &user, ResourceKind::Document, id, Action::Read).await?;
    let doc = db::documents::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::DocumentNotFound, id))?;
    let data = state.storage.read(&doc.storage_key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, doc.mime_type),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    disposition_name(&doc.original_name)
                ),
            ),
        ],
        data,
    ))
}

/// Removes the row, then the file
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    check_access(&state, &user, ResourceKind::Document, id, Action::Write).await?;
    let storage_key = db::documents::delete(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::DocumentNotFound, id))?;
    if let Err(e) = state.storage.delete(&storage_key).await {
        tracing::warn!(document_id = id, error = %e, "Failed to remove document file");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_name() {
        assert_eq!(disposition_name("smlouva 2026.pdf"), "smlouva 2026.pdf");
        assert_eq!(disposition_name("výkaz.xlsx"), "v_kaz.xlsx");
        assert_eq!(disposition_name("a\"b\r\n.pdf"), "a_b__.pdf");
        assert_eq!(disposition_name("   "), "document");
    }

    #[test]
    fn test_storage_errors_map_to_codes() {
        let code = |e: StorageError| AppError::from(e).code;
        assert_eq!(code(StorageError::Empty), ErrorCode::EmptyFile);
        assert_eq!(code(StorageError::TooLarge), ErrorCode::FileTooLarge);
        assert_eq!(
            code(StorageError::UnsupportedFormat("exe".into())),
            ErrorCode::UnsupportedFileFormat
        );
        assert_eq!(
            code(StorageError::InvalidKey("..".into())),
            ErrorCode::FileStorageFailed
        );
    }
}
