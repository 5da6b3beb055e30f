use serde::{Deserialize, Serialize};

use super::repo_types::Comment;

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentEnvelope<T> {
    pub comment: T,
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewCommentRequest {
    pub body: Option<String>,
}
