use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::db::store::BlogStore;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub store: BlogStore,
}
