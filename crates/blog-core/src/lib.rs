//! # Blog Core
//!
//! The domain layer of the blog backend.
//! This crate contains the post aggregate, its ports and the application
//! service, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod read;
pub mod service;

pub use error::DomainError;
pub use service::BlogPostService;
