use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use conduit::{
    articles::{
        repo_types::{Article, ArticleCursor, ArticleForm},
        ArticleStore,
    },
    comments::{repo_types::Comment, CommentStore},
    users::{
        repo_types::{NewUser, Profile, User, UserPatch},
        UserStore,
    },
};

/// In-memory users; `fail_writes` simulates a store that rejects inserts
/// and updates (e.g. a unique-constraint race).
#[derive(Default)]
pub struct MemoryUserStore {
    pub users: Mutex<Vec<User>>,
    pub fail_writes: AtomicBool,
}

impl MemoryUserStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }

    pub fn find_sync(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.find_sync(email))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<User> {
        anyhow::ensure!(
            !self.fail_writes.load(Ordering::SeqCst),
            "duplicate key value violates unique constraint"
        );
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            bio: None,
            image: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> anyhow::Result<bool> {
        anyhow::ensure!(
            !self.fail_writes.load(Ordering::SeqCst),
            "duplicate key value violates unique constraint"
        );
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        if let Some(v) = &patch.username {
            user.username = v.clone();
        }
        if let Some(v) = &patch.email {
            user.email = v.clone();
        }
        if let Some(v) = &patch.password_hash {
            user.password_hash = v.clone();
        }
        if let Some(v) = &patch.bio {
            user.bio = v.clone();
        }
        if let Some(v) = &patch.image {
            user.image = v.clone();
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(true)
    }
}

/// In-memory articles that also records the arguments of `list`.
#[derive(Default)]
pub struct MemoryArticleStore {
    pub articles: Mutex<Vec<Article>>,
    pub list_calls: Mutex<Vec<(i64, Option<ArticleCursor>)>>,
    pub fail_writes: AtomicBool,
}

impl MemoryArticleStore {
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    /// Seeds an article directly, `minutes_ago` in the past.
    pub fn seed(&self, slug: &str, author: &User, minutes_ago: i64) -> Article {
        let created_at = OffsetDateTime::now_utc() - Duration::minutes(minutes_ago);
        let article = Article {
            id: Uuid::new_v4(),
            slug: slug.to_owned(),
            title: slug.replace('-', " "),
            description: format!("about {slug}"),
            body: format!("body of {slug}"),
            tag_list: vec!["seed".into()],
            author_id: author.id,
            author: Profile::from(author),
            created_at,
            updated_at: created_at,
        };
        self.articles.lock().unwrap().push(article.clone());
        article
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn list(&self, limit: i64, cursor: Option<ArticleCursor>) -> anyhow::Result<Vec<Article>> {
        self.list_calls.lock().unwrap().push((limit, cursor.clone()));
        let mut all = self.articles.lock().unwrap().clone();
        all.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(all
            .into_iter()
            .filter(|a| match &cursor {
                Some(c) => (a.created_at, a.id) < (c.created_at, c.id),
                None => true,
            })
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.articles.lock().unwrap().len() as i64)
    }

    async fn find_by_slug(&self, slug: &str) -> anyhow::Result<Option<Article>> {
        Ok(self
            .articles
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.slug == slug)
            .cloned())
    }

    async fn exists_by_slug(&self, slug: &str) -> anyhow::Result<bool> {
        Ok(self.articles.lock().unwrap().iter().any(|a| a.slug == slug))
    }

    async fn save(&self, form: &ArticleForm, slug: &str, author: &User) -> anyhow::Result<Article> {
        anyhow::ensure!(!self.fail_writes.load(Ordering::SeqCst), "connection reset");
        let now = OffsetDateTime::now_utc();
        let mut articles = self.articles.lock().unwrap();
        if let Some(existing) = articles.iter_mut().find(|a| a.slug == slug) {
            anyhow::ensure!(existing.author_id == author.id, "slug {slug} owned by another author");
            existing.title = form.title.clone();
            existing.description = form.description.clone();
            existing.body = form.body.clone();
            existing.tag_list = form.tag_list.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let article = Article {
            id: Uuid::new_v4(),
            slug: slug.to_owned(),
            title: form.title.clone(),
            description: form.description.clone(),
            body: form.body.clone(),
            tag_list: form.tag_list.clone(),
            author_id: author.id,
            author: Profile::from(author),
            created_at: now,
            updated_at: now,
        };
        articles.push(article.clone());
        Ok(article)
    }

    async fn remove(&self, article: &Article) -> anyhow::Result<Article> {
        let mut articles = self.articles.lock().unwrap();
        let before = articles.len();
        articles.retain(|a| a.id != article.id);
        anyhow::ensure!(articles.len() < before, "article {} already removed", article.slug);
        Ok(article.clone())
    }
}

#[derive(Default)]
pub struct MemoryCommentStore {
    pub comments: Mutex<Vec<Comment>>,
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn list(&self, slug: &str) -> anyhow::Result<Vec<Comment>> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.article_slug == slug)
            .cloned()
            .collect())
    }

    async fn create(&self, article: &Article, body: &str, author: &User) -> anyhow::Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            body: body.to_owned(),
            article_slug: article.slug.clone(),
            author_id: author.id,
            author: Profile::from(author),
            created_at: OffsetDateTime::now_utc(),
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }
}
