use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::*;
use crate::store;
use crate::uploads;
use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection,
        rejection::PathRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<FileResponse>), AppError> {
    let mut multipart = multipart?;
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let client_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;

        let data = field.bytes().await?;

        if data.len() > state.config.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File size exceeds maximum of {} bytes",
                state.config.max_upload_bytes
            )));
        }

        upload = Some((client_name, data));
    }

    let (client_name, data) =
        upload.ok_or_else(|| AppError::Validation("Could not find file data".to_string()))?;

    let name = uploads::secure_filename(&client_name).ok_or_else(|| {
        tracing::warn!("Rejected upload with filename {:?}", client_name);
        AppError::Validation(format!("Invalid filename: {}", client_name))
    })?;

    let mut conn = state.db_pool.get().map_err(|_| AppError::DatabaseError)?;

    let file = store::create_file(&mut conn, &name)?;

    if let Err(e) = uploads::save_upload(&state.config.upload_dir, &file.name, &data).await {
        if let Err(cleanup) = store::delete_file(&mut conn, file.id) {
            tracing::error!("Failed to remove file record {}: {}", file.id, cleanup);
        }
        return Err(AppError::Io(e));
    }

    tracing::info!("Stored upload {} ({} bytes) as file {}", file.name, data.len(), file.id);

    Ok((
        StatusCode::CREATED,
        Json(file.as_dictionary(&state.config.public_base_url)),
    ))
}

pub async fn get_file(
    State(state): State<AppState>,
    file_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<FileResponse>, AppError> {
    let Path(file_id) = file_id?;

    let mut conn = state.db_pool.get().map_err(|_| AppError::DatabaseError)?;

    let file = store::get_file(&mut conn, file_id)?;

    Ok(Json(file.as_dictionary(&state.config.public_base_url)))
}
