// src/services/access.rs
// DOCUMENTATION: Photo authorization
// PURPOSE: Decide whether a caller may read a photo

use crate::errors::GatewayError;
use crate::models::{AuthContext, PhotoAccess};

/// Grant access to superadmins and to the physician who owns the patient
/// DOCUMENTATION: Exactly two conditions. No other role gains access and
/// grants are never cached.
pub fn authorize(ctx: &AuthContext, access: &PhotoAccess) -> Result<(), GatewayError> {
    if ctx.role.is_superadmin() {
        return Ok(());
    }

    if access.owner_user_id.as_deref() == Some(ctx.user_id.as_str()) {
        return Ok(());
    }

    log::warn!(
        "Denied photo access: user {} ({}) on patient {}",
        ctx.user_id,
        ctx.role,
        access.patient_id
    );
    Err(GatewayError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(owner: Option<&str>) -> PhotoAccess {
        PhotoAccess {
            photo_path: "uploads/wound_photos/p1.jpg".to_string(),
            patient_id: "P1".to_string(),
            owner_user_id: owner.map(str::to_string),
        }
    }

    #[test]
    fn test_owner_is_allowed_regardless_of_role() {
        for role in ["physician", "practice_admin", "manufacturer", ""] {
            let ctx = AuthContext::new("doc-a", role);
            assert!(authorize(&ctx, &access(Some("doc-a"))).is_ok());
        }
    }

    #[test]
    fn test_superadmin_is_allowed_regardless_of_owner() {
        let ctx = AuthContext::new("root", "superadmin");
        assert!(authorize(&ctx, &access(Some("doc-a"))).is_ok());
        assert!(authorize(&ctx, &access(None)).is_ok());
    }

    #[test]
    fn test_other_users_are_forbidden() {
        let ctx = AuthContext::new("doc-b", "physician");
        assert!(matches!(
            authorize(&ctx, &access(Some("doc-a"))),
            Err(GatewayError::Forbidden)
        ));
    }

    #[test]
    fn test_other_admin_roles_do_not_bypass_ownership() {
        for role in ["admin", "sales", "Superadmin"] {
            let ctx = AuthContext::new("staff-1", role);
            assert!(authorize(&ctx, &access(Some("doc-a"))).is_err());
        }
    }

    #[test]
    fn test_ownerless_patient_is_forbidden_to_non_superadmins() {
        let ctx = AuthContext::new("doc-a", "physician");
        assert!(authorize(&ctx, &access(None)).is_err());
    }
}
