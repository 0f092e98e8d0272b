//! Shared-password gate for mutating admin calls.

use crate::error::ContentError;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Checks the admin password sent with every write.
///
/// With no password configured every request passes. The comparison is exact
/// and runs in constant time.
#[derive(Clone, Default)]
pub struct AdminAuth {
    password: Option<Arc<str>>,
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AdminAuth {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.map(Arc::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub fn verify(&self, candidate: Option<&str>) -> Result<(), ContentError> {
        let Some(expected) = &self.password else {
            return Ok(());
        };
        let candidate = candidate.unwrap_or_default();
        if bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())) {
            info!(target: "audit", event_type = "auth_success", "Admin password accepted");
            Ok(())
        } else {
            warn!(
                target: "audit",
                event_type = "auth_failure",
                provided = !candidate.is_empty(),
                "Admin password rejected"
            );
            Err(ContentError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_accepts_anything() {
        let auth = AdminAuth::new(None);
        assert!(!auth.is_enabled());
        assert!(auth.verify(None).is_ok());
        assert!(auth.verify(Some("whatever")).is_ok());
    }

    #[test]
    fn test_exact_match_required() {
        let auth = AdminAuth::new(Some("s3cret".to_string()));
        assert!(auth.verify(Some("s3cret")).is_ok());
        assert_eq!(auth.verify(Some("s3cret ")), Err(ContentError::Unauthorized));
        assert_eq!(auth.verify(Some("S3CRET")), Err(ContentError::Unauthorized));
        assert_eq!(auth.verify(Some("")), Err(ContentError::Unauthorized));
        assert_eq!(auth.verify(None), Err(ContentError::Unauthorized));
    }

    #[test]
    fn test_debug_hides_password() {
        let auth = AdminAuth::new(Some("s3cret".to_string()));
        assert!(!format!("{:?}", auth).contains("s3cret"));
    }
}
