use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::*;
use crate::store::{self, FileRetention};
use crate::uploads;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

pub async fn list_songs(
    State(state): State<AppState>,
) -> Result<Json<Vec<SongResponse>>, AppError> {
    let mut conn = state.db_pool.get().map_err(|_| AppError::DatabaseError)?;

    let songs = store::list_songs(&mut conn)?
        .iter()
        .map(|(song, file)| song.as_dictionary(file.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(songs))
}

pub async fn get_song(
    State(state): State<AppState>,
    song_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<SongResponse>, AppError> {
    let Path(song_id) = song_id?;

    let mut conn = state.db_pool.get().map_err(|_| AppError::DatabaseError)?;

    let (song, file) = store::get_song(&mut conn, song_id)?;

    Ok(Json(song.as_dictionary(file.as_ref())?))
}

pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<CreateSongRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let mut conn = state.db_pool.get().map_err(|_| AppError::DatabaseError)?;

    let (song, file) = store::create_song(&mut conn, payload.id, payload.file.as_ref())?;
    tracing::info!("Created song {} with file {}", song.id, file.id);

    let location = format!("{}/api/songs/{}", state.config.public_base_url, song.id);
    let body = song.as_dictionary(Some(&file))?;

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(body)).into_response())
}

pub async fn update_song(
    State(state): State<AppState>,
    song_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateSongRequest>, JsonRejection>,
) -> Result<Json<SongResponse>, AppError> {
    let Path(song_id) = song_id?;
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let mut conn = state.db_pool.get().map_err(|_| AppError::DatabaseError)?;

    let (song, file) = store::update_song(&mut conn, song_id, payload.file.as_ref())?;
    tracing::info!("Song {} now uses file {}", song.id, file.id);

    Ok(Json(song.as_dictionary(Some(&file))?))
}

pub async fn delete_song(
    State(state): State<AppState>,
    song_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<SongResponse>, AppError> {
    let Path(song_id) = song_id?;

    let mut conn = state.db_pool.get().map_err(|_| AppError::DatabaseError)?;

    let retention = state.config.file_retention;
    let (song, file) = store::delete_song(&mut conn, song_id, retention)?;
    tracing::info!("Deleted song {}", song.id);

    if let (FileRetention::Cascade, Some(file)) = (retention, &file) {
        // another upload may have been stored under the same name
        if !store::file_name_in_use(&mut conn, &file.name)? {
            uploads::remove_upload(&state.config.upload_dir, &file.name).await?;
            tracing::info!("Removed upload {}", file.name);
        }
    }

    Ok(Json(song.as_dictionary(file.as_ref())?))
}
