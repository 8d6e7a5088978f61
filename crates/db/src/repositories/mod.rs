//! Database repositories.

#![allow(missing_docs)]

pub mod audit;
pub mod comment;
pub mod content;
pub mod principal;

pub use audit::{AuditQuery, AuditRepository};
pub use comment::CommentRepository;
pub use content::ContentRepository;
pub use principal::PrincipalRepository;
