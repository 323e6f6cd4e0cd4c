//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;
mod vote;

pub use comment::Comment;
pub use post::{BlogPost, NewBlogPost};
pub use user::{AuthorSummary, Role, User};
pub use vote::{Ballot, Vote, VoteChange, VoteDirection};
