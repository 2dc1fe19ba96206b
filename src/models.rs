use crate::store::StoreError;
use crate::uploads;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::files)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct File {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::files)]
pub struct NewFile<'a> {
    pub id: Option<i32>,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::songs)]
#[diesel(belongs_to(File, foreign_key = file_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Song {
    pub id: i32,
    pub file_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::songs)]
pub struct NewSong {
    pub id: Option<i32>,
    pub file_id: i32,
}

impl File {
    /// `path` points at the public retrieval route for the stored bytes.
    pub fn as_dictionary(&self, base_url: &str) -> FileResponse {
        FileResponse {
            id: self.id,
            name: self.name.clone(),
            path: uploads::upload_url(base_url, &self.name),
        }
    }
}

impl Song {
    /// Embeds the owned file's id and name. Fails when `file` is not the
    /// record this song references.
    pub fn as_dictionary(&self, file: Option<&File>) -> Result<SongResponse, StoreError> {
        let file = file.filter(|f| f.id == self.file_id).ok_or_else(|| {
            StoreError::Integrity(format!(
                "Song {} references missing file {}",
                self.id, self.file_id
            ))
        })?;

        Ok(SongResponse {
            id: self.id,
            file: SongFileResponse {
                id: file.id,
                name: file.name.clone(),
            },
        })
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct FileResponse {
    pub id: i32,
    pub name: String,
    pub path: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SongFileResponse {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SongResponse {
    pub id: i32,
    pub file: SongFileResponse,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

/// Reference to the file a song should own: an existing record by id, or a
/// new record built from `name`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SongFileRequest {
    pub id: Option<i32>,
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateSongRequest {
    pub id: Option<i32>,
    pub file: Option<SongFileRequest>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateSongRequest {
    pub file: Option<SongFileRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_dictionary_has_upload_url() {
        let file = File {
            id: 3,
            name: "1.mp3".to_string(),
        };

        let dict = file.as_dictionary("http://localhost:8080");

        assert_eq!(dict.id, 3);
        assert_eq!(dict.name, "1.mp3");
        assert_eq!(dict.path, "http://localhost:8080/uploads/1.mp3");
    }

    #[test]
    fn test_song_dictionary_embeds_file() {
        let file = File {
            id: 7,
            name: "2.mp3".to_string(),
        };
        let song = Song { id: 1, file_id: 7 };

        let dict = song.as_dictionary(Some(&file)).unwrap();

        assert_eq!(
            dict,
            SongResponse {
                id: 1,
                file: SongFileResponse {
                    id: 7,
                    name: "2.mp3".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_song_dictionary_without_file_is_integrity_error() {
        let song = Song { id: 1, file_id: 7 };

        let result = song.as_dictionary(None);

        assert!(matches!(result, Err(StoreError::Integrity(_))));
    }

    #[test]
    fn test_song_dictionary_with_wrong_file_is_integrity_error() {
        let other = File {
            id: 8,
            name: "other.mp3".to_string(),
        };
        let song = Song { id: 1, file_id: 7 };

        let result = song.as_dictionary(Some(&other));

        assert!(matches!(result, Err(StoreError::Integrity(_))));
    }

    #[test]
    fn test_song_dictionary_json_shape() {
        let file = File {
            id: 2,
            name: "a.ogg".to_string(),
        };
        let song = Song { id: 5, file_id: 2 };

        let value = serde_json::to_value(song.as_dictionary(Some(&file)).unwrap()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "id": 5, "file": { "id": 2, "name": "a.ogg" } })
        );
    }
}
