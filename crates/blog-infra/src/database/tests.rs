#[cfg(test)]
mod tests {
    use crate::database::entity::post::{self, Comments, Tags, Votes};
    use crate::database::postgres_repo::PostgresBlogPostRepository;
    use blog_core::domain::{BlogPost, Comment, Vote, VoteDirection};
    use blog_core::error::RepoError;
    use blog_core::ports::{BaseRepository, BlogPostRepository, SaveMode};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: uuid::Uuid, author_id: uuid::Uuid) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            author_id,
            title: "Test Post".to_owned(),
            body: "Content".to_owned(),
            tags: Tags(vec!["rust".to_owned()]),
            score: 1,
            votes: Votes(vec![Vote {
                user_id: author_id,
                value: VoteDirection::Up,
            }]),
            comments: Comments(vec![Comment::new(author_id, "first".to_owned())]),
            created_at: now.into(),
            view_count: 3,
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model(post_id, author_id)]])
            .into_connection();

        let repo = PostgresBlogPostRepository::new(db);

        let result: Option<BlogPost> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
        assert_eq!(post.score, 1);
        assert_eq!(post.votes[0].user_id, author_id);
        assert_eq!(post.comments[0].body, "first");
        assert_eq!(post.view_count, 3);
    }

    #[tokio::test]
    async fn test_create_post_returns_stored_row() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();
        let stored = model(post_id, author_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored.clone()]])
            .into_connection();

        let repo = PostgresBlogPostRepository::new(db);
        let post: BlogPost = stored.into();

        let saved = repo.save(post.clone(), SaveMode::Creating).await.unwrap();
        assert_eq!(saved, post);
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresBlogPostRepository::new(db);
        let post: BlogPost = model(post_id, author_id).into();

        let result = repo.save(post, SaveMode::Updating).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_by_author() {
        let author_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                model(uuid::Uuid::new_v4(), author_id),
                model(uuid::Uuid::new_v4(), author_id),
            ]])
            .into_connection();

        let repo = PostgresBlogPostRepository::new(db);

        let posts = repo.find_by_author(author_id).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.author_id == author_id));
    }

    #[tokio::test]
    async fn test_increment_views_is_a_single_counter_update() {
        let post_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = PostgresBlogPostRepository::new(db);
        repo.increment_views(post_id).await.unwrap();

        let log = repo.db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with(r#"UPDATE "blog_posts" SET "view_count" = "view_count" + "#));
        assert!(!sql.contains(r#""votes""#));
        assert!(!sql.contains(r#""comments""#));
    }

    #[tokio::test]
    async fn test_increment_views_on_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresBlogPostRepository::new(db);

        let result = repo.increment_views(uuid::Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
