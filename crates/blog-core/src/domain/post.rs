use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::comment::Comment;
use super::vote::{Ballot, Vote, VoteChange};
use crate::error::DomainError;

/// Submission data for a new post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlogPost {
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Blog post aggregate - content, votes and comments stored as one document.
///
/// `score` is denormalized: it always equals the sum of `votes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub score: i64,
    pub votes: Vec<Vote>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub view_count: i64,
}

impl BlogPost {
    /// Create a new post with no votes. Fails when author, title, body or a tag is missing.
    pub fn new(draft: NewBlogPost) -> Result<Self, DomainError> {
        if draft.author_id.is_nil() {
            return Err(DomainError::validation("author is required"));
        }
        if draft.title.is_empty() {
            return Err(DomainError::validation("title is required"));
        }
        if draft.body.is_empty() {
            return Err(DomainError::validation("body is required"));
        }
        if draft.tags.iter().any(String::is_empty) {
            return Err(DomainError::validation("tags must not be empty"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            author_id: draft.author_id,
            title: draft.title,
            body: draft.body,
            tags: draft.tags,
            score: 0,
            votes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
            view_count: 0,
        })
    }

    /// Apply a user's ballot, keeping at most one vote per user and `score` in sync.
    pub fn cast_vote(&mut self, user_id: Uuid, ballot: Ballot) -> VoteChange {
        let existing = self.votes.iter().position(|v| v.user_id == user_id);

        match (existing, ballot.direction()) {
            (Some(idx), None) => {
                let removed = self.votes.remove(idx);
                self.score -= removed.value.weight();
                VoteChange::Retracted
            }
            (Some(idx), Some(direction)) => {
                let vote = &mut self.votes[idx];
                let change = if vote.value == direction {
                    VoteChange::Unchanged
                } else {
                    VoteChange::Changed
                };
                self.score -= vote.value.weight();
                vote.value = direction;
                self.score += direction.weight();
                change
            }
            (None, None) => VoteChange::Ignored,
            (None, Some(direction)) => {
                self.votes.push(Vote {
                    user_id,
                    value: direction,
                });
                self.score += direction.weight();
                VoteChange::Added
            }
        }
    }

    /// Append a comment at the end of the thread.
    pub fn add_comment(&mut self, author_id: Uuid, body: String) -> Result<&Comment, DomainError> {
        if body.is_empty() {
            return Err(DomainError::validation("comment body is required"));
        }

        self.comments.push(Comment::new(author_id, body));
        let idx = self.comments.len() - 1;
        Ok(&self.comments[idx])
    }

    /// Remove one comment of this post, keeping the order of the rest.
    pub fn remove_comment(&mut self, comment_id: Uuid) -> Result<Comment, DomainError> {
        let idx = self
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| DomainError::comment_not_found(comment_id))?;

        Ok(self.comments.remove(idx))
    }

    pub fn record_view(&mut self) {
        self.view_count = self.view_count.saturating_add(1);
    }

    pub fn vote_of(&self, user_id: Uuid) -> Option<&Vote> {
        self.votes.iter().find(|v| v.user_id == user_id)
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}
