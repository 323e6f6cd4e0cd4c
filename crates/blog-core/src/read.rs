//! Read projection - the shape a post takes when it leaves the service.
//!
//! Which author references get resolved is decided by an explicit [`ReadPolicy`].
//! Resolved users are always rendered as [`AuthorSummary`], so role and
//! credential fields never leave the service.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AuthorSummary, BlogPost, Comment, User, Vote};
use crate::error::RepoError;
use crate::ports::UserRepository;

/// A user reference that can be eagerly resolved on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// The post's author.
    Author,
    /// The author of every comment.
    CommentAuthors,
}

/// Relations to resolve on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPolicy {
    relations: HashSet<Relation>,
}

impl ReadPolicy {
    /// Resolve nothing; authors stay bare ids.
    pub fn ids_only() -> Self {
        Self {
            relations: HashSet::new(),
        }
    }

    pub fn with(mut self, relation: Relation) -> Self {
        self.relations.insert(relation);
        self
    }

    pub fn resolves(&self, relation: Relation) -> bool {
        self.relations.contains(&relation)
    }
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self::ids_only()
            .with(Relation::Author)
            .with(Relation::CommentAuthors)
    }
}

/// An author as it appears in a view: resolved summary or bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Summary(AuthorSummary),
    Id(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: AuthorRef,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Externally visible post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPostView {
    pub id: Uuid,
    pub author: AuthorRef,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub score: i64,
    pub votes: Vec<Vote>,
    pub vote_count: usize,
    pub comments: Vec<CommentView>,
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
    pub view_count: i64,
}

/// Applies a [`ReadPolicy`] using a user repository for lookups.
pub struct Projector<'a> {
    users: &'a dyn UserRepository,
    policy: &'a ReadPolicy,
}

impl<'a> Projector<'a> {
    pub fn new(users: &'a dyn UserRepository, policy: &'a ReadPolicy) -> Self {
        Self { users, policy }
    }

    pub async fn project(&self, post: BlogPost) -> Result<BlogPostView, RepoError> {
        let mut views = self.project_all(vec![post]).await?;
        views
            .pop()
            .ok_or_else(|| RepoError::Query("projection produced no view".to_string()))
    }

    /// Project a batch, resolving all referenced users in one lookup.
    pub async fn project_all(&self, posts: Vec<BlogPost>) -> Result<Vec<BlogPostView>, RepoError> {
        let ids = self.referenced_users(&posts);
        let directory: HashMap<Uuid, AuthorSummary> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_by_ids(&ids)
                .await?
                .iter()
                .map(|u: &User| (u.id, AuthorSummary::from(u)))
                .collect()
        };

        Ok(posts
            .into_iter()
            .map(|post| self.render(post, &directory))
            .collect())
    }

    fn referenced_users(&self, posts: &[BlogPost]) -> Vec<Uuid> {
        let mut ids = HashSet::new();
        for post in posts {
            if self.policy.resolves(Relation::Author) {
                ids.insert(post.author_id);
            }
            if self.policy.resolves(Relation::CommentAuthors) {
                ids.extend(post.comments.iter().map(|c| c.author_id));
            }
        }
        ids.into_iter().collect()
    }

    fn render(&self, post: BlogPost, directory: &HashMap<Uuid, AuthorSummary>) -> BlogPostView {
        let author = resolve(
            post.author_id,
            self.policy.resolves(Relation::Author),
            directory,
        );
        let resolve_commenters = self.policy.resolves(Relation::CommentAuthors);
        let comments: Vec<CommentView> = post
            .comments
            .into_iter()
            .map(|c: Comment| CommentView {
                id: c.id,
                author: resolve(c.author_id, resolve_commenters, directory),
                body: c.body,
                created_at: c.created_at,
            })
            .collect();

        BlogPostView {
            id: post.id,
            author,
            title: post.title,
            body: post.body,
            tags: post.tags,
            score: post.score,
            vote_count: post.votes.len(),
            votes: post.votes,
            comment_count: comments.len(),
            comments,
            created_at: post.created_at,
            view_count: post.view_count,
        }
    }
}

fn resolve(id: Uuid, enabled: bool, directory: &HashMap<Uuid, AuthorSummary>) -> AuthorRef {
    match directory.get(&id) {
        Some(summary) if enabled => AuthorRef::Summary(summary.clone()),
        _ => AuthorRef::Id(id),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{NewBlogPost, Role};
    use crate::ports::{BaseRepository, SaveMode};

    struct FixedUsers(Vec<User>);

    #[async_trait]
    impl BaseRepository<User, Uuid> for FixedUsers {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.id == id).cloned())
        }

        async fn save(&self, user: User, _mode: SaveMode) -> Result<User, RepoError> {
            Ok(user)
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for FixedUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
            Ok(self
                .0
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        }
    }

    fn admin(name: &str) -> User {
        let mut user = User::new(
            name.to_string(),
            format!("{name}@example.com"),
            "hash".to_string(),
        );
        user.role = Role::Admin;
        user
    }

    fn post_by(author: &User, commenter: &User) -> BlogPost {
        let mut post = BlogPost::new(NewBlogPost {
            author_id: author.id,
            title: "Title".to_string(),
            body: "Body".to_string(),
            tags: vec![],
        })
        .unwrap();
        post.add_comment(commenter.id, "nice".to_string()).unwrap();
        post
    }

    #[tokio::test]
    async fn test_default_policy_resolves_authors() {
        let author = admin("alice");
        let commenter = admin("bob");
        let users = FixedUsers(vec![author.clone(), commenter.clone()]);
        let policy = ReadPolicy::default();

        let view = Projector::new(&users, &policy)
            .project(post_by(&author, &commenter))
            .await
            .unwrap();

        assert_eq!(
            view.author,
            AuthorRef::Summary(AuthorSummary {
                id: author.id,
                username: "alice".to_string()
            })
        );
        assert!(matches!(view.comments[0].author, AuthorRef::Summary(_)));
        assert_eq!(view.comment_count, 1);
    }

    #[tokio::test]
    async fn test_view_hides_sensitive_user_fields() {
        let author = admin("alice");
        let users = FixedUsers(vec![author.clone()]);
        let policy = ReadPolicy::default();

        let view = Projector::new(&users, &policy)
            .project(post_by(&author, &author))
            .await
            .unwrap();
        let json = serde_json::to_string(&view).unwrap();

        assert!(json.contains("alice"));
        assert!(!json.contains("admin"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("@example.com"));
    }

    #[tokio::test]
    async fn test_unresolved_relations_stay_ids() {
        let author = admin("alice");
        let commenter = admin("bob");
        let users = FixedUsers(vec![author.clone()]);
        let policy = ReadPolicy::ids_only().with(Relation::Author);

        let view = Projector::new(&users, &policy)
            .project(post_by(&author, &commenter))
            .await
            .unwrap();

        assert!(matches!(view.author, AuthorRef::Summary(_)));
        assert_eq!(view.comments[0].author, AuthorRef::Id(commenter.id));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["comments"][0]["author"], commenter.id.to_string());
    }

    #[tokio::test]
    async fn test_missing_user_falls_back_to_id() {
        let author = admin("alice");
        let users = FixedUsers(vec![]);
        let policy = ReadPolicy::default();

        let view = Projector::new(&users, &policy)
            .project(post_by(&author, &author))
            .await
            .unwrap();

        assert_eq!(view.author, AuthorRef::Id(author.id));
    }
}
