use crate::models::{File, NewFile, NewSong, Song, SongFileRequest};
use crate::schema::{files, songs};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Integrity(String),
    #[error("Database error: {0}")]
    Database(#[from] DieselError),
}

/// What happens to a song's file record when the song is deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileRetention {
    #[default]
    Retain,
    Cascade,
}

pub fn create_file(conn: &mut SqliteConnection, name: &str) -> Result<File, StoreError> {
    insert_file(conn, None, name)
}

pub fn get_file(conn: &mut SqliteConnection, file_id: i32) -> Result<File, StoreError> {
    files::table
        .find(file_id)
        .select(File::as_select())
        .first::<File>(conn)
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("Could not find file with id {}", file_id)))
}

pub fn delete_file(conn: &mut SqliteConnection, file_id: i32) -> Result<(), StoreError> {
    diesel::delete(files::table.find(file_id))
        .execute(conn)
        .map_err(|e| constraint_error(e, || format!("File {} is still in use", file_id)))?;
    Ok(())
}

pub fn file_name_in_use(conn: &mut SqliteConnection, name: &str) -> Result<bool, StoreError> {
    let count: i64 = files::table
        .filter(files::name.eq(name))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub fn create_song(
    conn: &mut SqliteConnection,
    song_id: Option<i32>,
    file: Option<&SongFileRequest>,
) -> Result<(Song, File), StoreError> {
    let file_ref =
        file.ok_or_else(|| StoreError::Validation("'file' is a required property".to_string()))?;

    if let Some(id) = song_id {
        check_id("song", id)?;
    }

    conn.transaction::<_, StoreError, _>(|conn| {
        if let Some(id) = song_id {
            let existing = songs::table
                .find(id)
                .select(Song::as_select())
                .first::<Song>(conn)
                .optional()?;
            if existing.is_some() {
                return Err(StoreError::Validation(format!(
                    "A song with id {} already exists",
                    id
                )));
            }
        }

        let file = resolve_file(conn, file_ref, None)?;

        let song: Song = diesel::insert_into(songs::table)
            .values(&NewSong {
                id: song_id,
                file_id: file.id,
            })
            .returning(Song::as_returning())
            .get_result(conn)
            .map_err(|e| constraint_error(e, || format!("File {} is already in use", file.id)))?;

        Ok((song, file))
    })
}

pub fn get_song(
    conn: &mut SqliteConnection,
    song_id: i32,
) -> Result<(Song, Option<File>), StoreError> {
    songs::table
        .left_join(files::table)
        .filter(songs::id.eq(song_id))
        .select((Song::as_select(), Option::<File>::as_select()))
        .first::<(Song, Option<File>)>(conn)
        .optional()?
        .ok_or_else(|| song_not_found(song_id))
}

pub fn list_songs(conn: &mut SqliteConnection) -> Result<Vec<(Song, Option<File>)>, StoreError> {
    let rows = songs::table
        .left_join(files::table)
        .order(songs::id.asc())
        .select((Song::as_select(), Option::<File>::as_select()))
        .load::<(Song, Option<File>)>(conn)?;
    Ok(rows)
}

/// Replaces the file a song owns. The previously owned file is kept.
pub fn update_song(
    conn: &mut SqliteConnection,
    song_id: i32,
    file: Option<&SongFileRequest>,
) -> Result<(Song, File), StoreError> {
    let file_ref =
        file.ok_or_else(|| StoreError::Validation("'file' is a required property".to_string()))?;

    conn.transaction::<_, StoreError, _>(|conn| {
        let (song, _) = get_song(conn, song_id)?;
        let file = resolve_file(conn, file_ref, Some(song.id))?;

        let song: Song = diesel::update(songs::table.find(song.id))
            .set(songs::file_id.eq(file.id))
            .returning(Song::as_returning())
            .get_result(conn)
            .map_err(|e| constraint_error(e, || format!("File {} is already in use", file.id)))?;

        Ok((song, file))
    })
}

pub fn delete_song(
    conn: &mut SqliteConnection,
    song_id: i32,
    retention: FileRetention,
) -> Result<(Song, Option<File>), StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let (song, file) = get_song(conn, song_id)?;

        diesel::delete(songs::table.find(song.id)).execute(conn)?;

        if retention == FileRetention::Cascade {
            if let Some(file) = &file {
                delete_file(conn, file.id)?;
            }
        }

        Ok((song, file))
    })
}

fn insert_file(
    conn: &mut SqliteConnection,
    file_id: Option<i32>,
    name: &str,
) -> Result<File, StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation("File name must not be empty".to_string()));
    }
    if let Some(id) = file_id {
        check_id("file", id)?;
    }

    diesel::insert_into(files::table)
        .values(&NewFile { id: file_id, name })
        .returning(File::as_returning())
        .get_result(conn)
        .map_err(|e| {
            constraint_error(e, || match file_id {
                Some(id) => format!("A file with id {} already exists", id),
                None => "File could not be stored".to_string(),
            })
        })
}

/// Finds or creates the file a song should own. `owner` is the song allowed
/// to already hold the file, if any.
fn resolve_file(
    conn: &mut SqliteConnection,
    file_ref: &SongFileRequest,
    owner: Option<i32>,
) -> Result<File, StoreError> {
    if let Some(file_id) = file_ref.id {
        let existing = files::table
            .find(file_id)
            .select(File::as_select())
            .first::<File>(conn)
            .optional()?;

        if let Some(existing) = existing {
            if let Some(name) = &file_ref.name {
                if *name != existing.name {
                    return Err(StoreError::Validation(format!(
                        "File {} is named '{}', not '{}'",
                        existing.id, existing.name, name
                    )));
                }
            }

            let holder = Song::belonging_to(&existing)
                .select(Song::as_select())
                .first::<Song>(conn)
                .optional()?;
            if let Some(holder) = holder {
                if Some(holder.id) != owner {
                    return Err(StoreError::Validation(format!(
                        "File {} already belongs to song {}",
                        existing.id, holder.id
                    )));
                }
            }

            return Ok(existing);
        }
    }

    let name = file_ref
        .name
        .as_deref()
        .ok_or_else(|| StoreError::Validation("'name' is a required property".to_string()))?;

    insert_file(conn, file_ref.id, name)
}

// Ids are assigned from 1 upwards; clients may only propose ids in that range.
fn check_id(entity: &str, id: i32) -> Result<(), StoreError> {
    if id < 1 {
        return Err(StoreError::Validation(format!(
            "A {} id must be a positive integer, got {}",
            entity, id
        )));
    }
    Ok(())
}

fn song_not_found(song_id: i32) -> StoreError {
    StoreError::NotFound(format!(
        "Sorry there is no song with the id {} in our database",
        song_id
    ))
}

fn constraint_error(err: DieselError, conflict: impl FnOnce() -> String) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StoreError::Validation(conflict())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreError::Integrity(info.message().to_string())
        }
        other => StoreError::Database(other),
    }
}
