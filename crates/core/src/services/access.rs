//! Access control layer.
//!
//! Maps a principal's role to its capability set. Role is a discriminated
//! tag mapped through a single pure function; there is no escalation path
//! outside this module and no role hierarchy to walk.

use chapterhub_db::entities::principal::PrincipalRole;

/// Capability set of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Write live fields without staging.
    pub can_write_direct: bool,
    /// Approve or reject staged revisions.
    pub can_review: bool,
    /// Permanently delete content.
    pub can_delete: bool,
    /// Read the audit trail.
    pub can_view_audit: bool,
}

impl Capabilities {
    const NONE: Self = Self {
        can_write_direct: false,
        can_review: false,
        can_delete: false,
        can_view_audit: false,
    };
}

/// Map a role to its capability set.
///
/// Pure and total over the role enum. Restricted principals hold no
/// capabilities at all: their edits are staged for review and they review
/// nothing. Audit access is what separates a superuser from an
/// unrestricted principal.
#[must_use]
pub const fn capabilities_for(role: PrincipalRole) -> Capabilities {
    match role {
        PrincipalRole::Restricted => Capabilities::NONE,
        PrincipalRole::Unrestricted => Capabilities {
            can_write_direct: true,
            can_review: true,
            can_delete: true,
            can_view_audit: false,
        },
        PrincipalRole::Superuser => Capabilities {
            can_write_direct: true,
            can_review: true,
            can_delete: true,
            can_view_audit: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_holds_no_capabilities() {
        let caps = capabilities_for(PrincipalRole::Restricted);
        assert!(!caps.can_write_direct);
        assert!(!caps.can_review);
        assert!(!caps.can_delete);
        assert!(!caps.can_view_audit);
    }

    #[test]
    fn test_unrestricted_writes_reviews_and_deletes() {
        let caps = capabilities_for(PrincipalRole::Unrestricted);
        assert!(caps.can_write_direct);
        assert!(caps.can_review);
        assert!(caps.can_delete);
        assert!(!caps.can_view_audit);
    }

    #[test]
    fn test_superuser_additionally_views_audit() {
        let caps = capabilities_for(PrincipalRole::Superuser);
        assert!(caps.can_write_direct);
        assert!(caps.can_review);
        assert!(caps.can_delete);
        assert!(caps.can_view_audit);
    }

    #[test]
    fn test_total_over_role_enum() {
        // Every role maps to some capability set without panicking.
        for role in [
            PrincipalRole::Restricted,
            PrincipalRole::Unrestricted,
            PrincipalRole::Superuser,
        ] {
            let _ = capabilities_for(role);
        }
    }
}
