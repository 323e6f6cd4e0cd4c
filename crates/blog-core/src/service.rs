//! Blog post application service.
//!
//! Every mutation loads the whole aggregate, changes it in memory and writes
//! it back as one document. Concurrent writers to the same post race at that
//! granularity and the last write wins.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Ballot, BlogPost, Comment, NewBlogPost, VoteChange};
use crate::error::{DomainError, RepoError};
use crate::ports::{BlogPostRepository, SaveMode, UserRepository};
use crate::read::{BlogPostView, Projector, ReadPolicy};

/// Operations on blog posts: creation, votes, comments and reads.
#[derive(Clone)]
pub struct BlogPostService {
    posts: Arc<dyn BlogPostRepository>,
    users: Arc<dyn UserRepository>,
    read_policy: ReadPolicy,
}

impl BlogPostService {
    pub fn new(posts: Arc<dyn BlogPostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self::with_read_policy(posts, users, ReadPolicy::default())
    }

    pub fn with_read_policy(
        posts: Arc<dyn BlogPostRepository>,
        users: Arc<dyn UserRepository>,
        read_policy: ReadPolicy,
    ) -> Self {
        Self {
            posts,
            users,
            read_policy,
        }
    }

    /// Create a post. The author's own upvote is added once the post is stored.
    pub async fn create(&self, draft: NewBlogPost) -> Result<BlogPostView, DomainError> {
        let post = BlogPost::new(draft)?;
        tracing::debug!(post_id = %post.id, author_id = %post.author_id, "Creating post");

        let post = self.persist(post, SaveMode::Creating).await?;
        self.project(post).await
    }

    pub async fn get(&self, id: Uuid) -> Result<BlogPostView, DomainError> {
        let post = self.load(id).await?;
        self.project(post).await
    }

    /// Fetch a post for display, counting the view.
    ///
    /// The counter is bumped by the store itself, so a reader never writes
    /// back votes or comments it loaded.
    pub async fn view(&self, id: Uuid) -> Result<BlogPostView, DomainError> {
        self.posts.increment_views(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::post_not_found(id),
            other => other.into(),
        })?;
        let post = self.load(id).await?;
        self.project(post).await
    }

    pub async fn list(&self) -> Result<Vec<BlogPostView>, DomainError> {
        let posts = self.posts.list().await?;
        self.project_all(posts).await
    }

    pub async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<BlogPostView>, DomainError> {
        let posts = self.posts.find_by_author(author_id).await?;
        self.project_all(posts).await
    }

    pub async fn cast_vote(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        ballot: Ballot,
    ) -> Result<BlogPostView, DomainError> {
        let mut post = self.load(post_id).await?;
        let change = post.cast_vote(user_id, ballot);
        tracing::debug!(%post_id, %user_id, %change, score = post.score, "Vote cast");

        let post = self.persist(post, SaveMode::Updating).await?;
        self.project(post).await
    }

    /// Append a comment and return it together with the updated post.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        body: String,
    ) -> Result<(Comment, BlogPostView), DomainError> {
        let mut post = self.load(post_id).await?;
        let comment = post.add_comment(author_id, body)?.clone();
        tracing::debug!(%post_id, comment_id = %comment.id, "Comment added");

        let post = self.persist(post, SaveMode::Updating).await?;
        Ok((comment, self.project(post).await?))
    }

    /// Remove a comment on behalf of `user_id`. Only the comment's author or a
    /// moderator may do so.
    pub async fn remove_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
        moderator: bool,
    ) -> Result<BlogPostView, DomainError> {
        let mut post = self.load(post_id).await?;
        let comment = post
            .comment(comment_id)
            .ok_or_else(|| DomainError::comment_not_found(comment_id))?;
        if comment.author_id != user_id && !moderator {
            tracing::warn!(%post_id, %comment_id, %user_id, "Comment removal refused");
            return Err(DomainError::Forbidden(
                "only the author may remove this comment".to_string(),
            ));
        }

        post.remove_comment(comment_id)?;
        tracing::debug!(%post_id, %comment_id, %user_id, "Comment removed");

        let post = self.persist(post, SaveMode::Updating).await?;
        self.project(post).await
    }

    /// Administrative removal of a whole post.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::post_not_found(id),
            other => other.into(),
        })?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<BlogPost, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    /// Write the post, then run the post-persist step for `mode`.
    async fn persist(&self, post: BlogPost, mode: SaveMode) -> Result<BlogPost, DomainError> {
        let id = post.id;
        let mut saved = self.write(post, mode).await?;

        if mode == SaveMode::Creating {
            let author_id = saved.author_id;
            let change = saved.cast_vote(author_id, Ballot::Up);
            debug_assert_eq!(change, VoteChange::Added);
            saved = self.write(saved, SaveMode::Updating).await?;
            tracing::info!(post_id = %id, %author_id, "Post created");
        }

        Ok(saved)
    }

    async fn write(&self, post: BlogPost, mode: SaveMode) -> Result<BlogPost, DomainError> {
        let id = post.id;
        self.posts.save(post, mode).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::post_not_found(id),
            other => {
                tracing::error!(post_id = %id, ?mode, error = %other, "Failed to persist post");
                other.into()
            }
        })
    }

    async fn project(&self, post: BlogPost) -> Result<BlogPostView, DomainError> {
        let view = Projector::new(self.users.as_ref(), &self.read_policy)
            .project(post)
            .await?;
        Ok(view)
    }

    async fn project_all(&self, posts: Vec<BlogPost>) -> Result<Vec<BlogPostView>, DomainError> {
        let views = Projector::new(self.users.as_ref(), &self.read_policy)
            .project_all(posts)
            .await?;
        Ok(views)
    }
}
