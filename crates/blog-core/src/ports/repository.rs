use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{BlogPost, User};
use crate::error::RepoError;

/// Whether a persist call writes a new document or replaces an existing one.
///
/// Decided once per persist operation by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Insert; fails with `RepoError::Constraint` if the id already exists.
    Creating,
    /// Full-document replace; fails with `RepoError::NotFound` if the document is gone.
    Updating,
}

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist the whole entity according to `mode`.
    async fn save(&self, entity: T, mode: SaveMode) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Batch lookup. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Blog post repository. Posts are returned newest first.
#[async_trait]
pub trait BlogPostRepository: BaseRepository<BlogPost, Uuid> {
    async fn list(&self) -> Result<Vec<BlogPost>, RepoError>;

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<BlogPost>, RepoError>;

    /// Bump the view counter in place, without rewriting the rest of the document.
    /// Fails with `RepoError::NotFound` if the post is gone.
    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;
}
