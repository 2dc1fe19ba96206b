use crate::config::Config;
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub config: Config,
}

impl AppState {
    pub fn new(db_pool: DbPool, config: Config) -> Self {
        Self { db_pool, config }
    }
}
