//! Identity port — who the current user is.

/// Accessor for the resolved user id. `None` means the user is not signed
/// in, which sessions treat as [`ErrorKind::AuthRequired`](crate::ErrorKind).
pub trait IdentityPort: Send + Sync {
    fn user_id(&self) -> Option<String>;
}

/// Identity fixed at construction time (CLI flag, env var, test).
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    pub fn new(user_id: Option<String>) -> Self {
        Self(user_id.filter(|id| !id.trim().is_empty()))
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self::new(Some(user_id.into()))
    }

    pub const fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityPort for StaticIdentity {
    fn user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_id_is_anonymous() {
        assert!(StaticIdentity::new(Some("  ".into())).user_id().is_none());
        assert_eq!(StaticIdentity::signed_in("u1").user_id().as_deref(), Some("u1"));
    }
}
