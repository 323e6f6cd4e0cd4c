//! In-memory document store - used when no database is configured.
//!
//! Each document is cloned in and out, so callers always work on a private
//! copy and a save replaces the whole document. Data is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{BlogPost, User};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, BlogPostRepository, SaveMode, UserRepository};

/// Document map keyed by id, guarded by an async RwLock.
struct DocumentStore<T> {
    docs: RwLock<HashMap<Uuid, T>>,
}

impl<T: Clone> DocumentStore<T> {
    fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
        }
    }

    async fn get(&self, id: Uuid) -> Option<T> {
        self.docs.read().await.get(&id).cloned()
    }

    async fn put(&self, id: Uuid, doc: T, mode: SaveMode) -> Result<T, RepoError> {
        let mut docs = self.docs.write().await;
        match mode {
            SaveMode::Creating if docs.contains_key(&id) => {
                return Err(RepoError::Constraint(format!("document {id} already exists")));
            }
            SaveMode::Updating if !docs.contains_key(&id) => return Err(RepoError::NotFound),
            _ => {}
        }
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    /// Change a stored document in place under the write lock.
    async fn modify(&self, id: Uuid, change: impl FnOnce(&mut T)) -> Result<(), RepoError> {
        let mut docs = self.docs.write().await;
        let doc = docs.get_mut(&id).ok_or(RepoError::NotFound)?;
        change(doc);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        self.docs
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.docs
            .read()
            .await
            .values()
            .filter(|d| pred(*d))
            .cloned()
            .collect()
    }
}

/// In-memory blog post repository.
pub struct InMemoryBlogPostRepository {
    store: DocumentStore<BlogPost>,
}

impl InMemoryBlogPostRepository {
    pub fn new() -> Self {
        Self {
            store: DocumentStore::new(),
        }
    }
}

impl Default for InMemoryBlogPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(mut posts: Vec<BlogPost>) -> Vec<BlogPost> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[async_trait]
impl BaseRepository<BlogPost, Uuid> for InMemoryBlogPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPost>, RepoError> {
        Ok(self.store.get(id).await)
    }

    async fn save(&self, post: BlogPost, mode: SaveMode) -> Result<BlogPost, RepoError> {
        self.store.put(post.id, post, mode).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.remove(id).await
    }
}

#[async_trait]
impl BlogPostRepository for InMemoryBlogPostRepository {
    async fn list(&self) -> Result<Vec<BlogPost>, RepoError> {
        Ok(newest_first(self.store.filter(|_| true).await))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<BlogPost>, RepoError> {
        Ok(newest_first(
            self.store.filter(|p| p.author_id == author_id).await,
        ))
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.modify(id, BlogPost::record_view).await
    }
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: DocumentStore<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            store: DocumentStore::new(),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.get(id).await)
    }

    async fn save(&self, user: User, mode: SaveMode) -> Result<User, RepoError> {
        if mode == SaveMode::Creating {
            let email = user.email.clone();
            if !self.store.filter(|u| u.email == email).await.is_empty() {
                return Err(RepoError::Constraint("email already registered".to_string()));
            }
        }
        self.store.put(user.id, user, mode).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.remove(id).await
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.store.filter(|u| u.email == email).await.into_iter().next())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        Ok(self.store.filter(|u| ids.contains(&u.id)).await)
    }
}

#[cfg(test)]
mod tests {
    use blog_core::domain::NewBlogPost;

    use super::*;

    fn post() -> BlogPost {
        BlogPost::new(NewBlogPost {
            author_id: Uuid::new_v4(),
            title: "t".to_string(),
            body: "b".to_string(),
            tags: vec![],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let repo = InMemoryBlogPostRepository::new();
        let p = post();
        repo.save(p.clone(), SaveMode::Creating).await.unwrap();

        assert_eq!(repo.find_by_id(p.id).await.unwrap(), Some(p));
    }

    #[tokio::test]
    async fn test_create_twice_is_constraint_error() {
        let repo = InMemoryBlogPostRepository::new();
        let p = post();
        repo.save(p.clone(), SaveMode::Creating).await.unwrap();

        let result = repo.save(p, SaveMode::Creating).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryBlogPostRepository::new();

        let result = repo.save(post(), SaveMode::Updating).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryBlogPostRepository::new();
        let p = post();
        repo.save(p.clone(), SaveMode::Creating).await.unwrap();

        repo.delete(p.id).await.unwrap();
        assert!(repo.find_by_id(p.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(p.id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_increment_views_touches_only_the_counter() {
        let repo = InMemoryBlogPostRepository::new();
        let p = post();
        repo.save(p.clone(), SaveMode::Creating).await.unwrap();

        repo.increment_views(p.id).await.unwrap();
        repo.increment_views(p.id).await.unwrap();

        let stored = repo.find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(stored.view_count, 2);
        assert_eq!(BlogPost { view_count: 0, ..stored }, p);
        assert!(matches!(
            repo.increment_views(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        let first = User::new("a".into(), "a@example.com".into(), "h".into());
        let second = User::new("b".into(), "a@example.com".into(), "h".into());
        repo.save(first, SaveMode::Creating).await.unwrap();

        let result = repo.save(second, SaveMode::Creating).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }
}
