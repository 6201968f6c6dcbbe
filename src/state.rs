use crate::{config::Config, question_types::ContentDomain};
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub activity_pool: PgPool,
    pub book_pool: PgPool,
    pub config: Config,
}

impl AppState {
    /// Pool holding the given wizard's content.
    pub fn pool_for(&self, domain: ContentDomain) -> &PgPool {
        match domain {
            ContentDomain::Activity => &self.activity_pool,
            ContentDomain::Book => &self.book_pool,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
