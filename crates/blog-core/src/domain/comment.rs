use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment embedded in a post. Its id is only meaningful within that post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            body,
            created_at: Utc::now(),
        }
    }
}
