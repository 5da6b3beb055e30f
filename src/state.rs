use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    articles::{ArticleStore, PgArticleStore},
    comments::{CommentStore, PgCommentStore},
    config::AppConfig,
    users::{PgUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub articles: Arc<dyn ArticleStore>,
    pub comments: Arc<dyn CommentStore>,
}

impl AppState {
    /// Every store backed by the same connection pool.
    pub fn postgres(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self {
            config,
            users: Arc::new(PgUserStore::new(db.clone())),
            articles: Arc::new(PgArticleStore::new(db.clone())),
            comments: Arc::new(PgCommentStore::new(db)),
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        articles: Arc<dyn ArticleStore>,
        comments: Arc<dyn CommentStore>,
    ) -> Self {
        Self {
            config,
            users,
            articles,
            comments,
        }
    }
}
