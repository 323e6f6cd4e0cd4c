//! Blog post entity for SeaORM.
//!
//! The aggregate is stored as one row: tags, votes and comments live in JSON
//! columns so a save rewrites the whole document.

use sea_orm::entity::prelude::*;
use sea_orm::{FromJsonQueryResult, Set};
use serde::{Deserialize, Serialize};

use blog_core::domain::{Comment, Vote};

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Tags(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Votes(pub Vec<Vote>);

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Comments(pub Vec<Comment>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blog_posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Tags,
    pub score: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub votes: Votes,
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Comments,
    pub created_at: DateTimeWithTimeZone,
    pub view_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to the domain aggregate.
impl From<Model> for blog_core::domain::BlogPost {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            body: model.body,
            tags: model.tags.0,
            score: model.score,
            votes: model.votes.0,
            comments: model.comments.0,
            created_at: model.created_at.into(),
            view_count: model.view_count,
        }
    }
}

/// Conversion from the domain aggregate to SeaORM ActiveModel.
impl From<blog_core::domain::BlogPost> for ActiveModel {
    fn from(post: blog_core::domain::BlogPost) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            body: Set(post.body),
            tags: Set(Tags(post.tags)),
            score: Set(post.score),
            votes: Set(Votes(post.votes)),
            comments: Set(Comments(post.comments)),
            created_at: Set(post.created_at.into()),
            view_count: Set(post.view_count),
        }
    }
}
