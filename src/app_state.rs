use sqlx::PgPool;
use std::sync::Arc;

use crate::config;
use crate::identity::IdentityProvider;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub idp: Arc<IdentityProvider>,
}

impl AppState {
    pub fn new(db: PgPool, env: config::Config, idp: Arc<IdentityProvider>) -> Self {
        Self { db, env, idp }
    }
}
