//! Business logic services.

#![allow(missing_docs)]

pub mod access;
pub mod audit;
pub mod comment;
pub mod content;
pub mod revision;

pub use access::{capabilities_for, Capabilities};
pub use audit::AuditTrailService;
pub use comment::{AddCommentInput, CommentService};
pub use content::ContentService;
pub use revision::{
    apply_patch, compute_diff, patch_from_json, patch_to_json, summarize, ContentFields,
    FieldChange, Patch,
};
