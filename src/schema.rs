diesel::table! {
    files (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    songs (id) {
        id -> Integer,
        file_id -> Integer,
    }
}

diesel::joinable!(songs -> files (file_id));

diesel::allow_tables_to_appear_in_same_query!(files, songs,);
