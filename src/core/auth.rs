//! Principals and read policies
//!
//! The query pipeline never looks at credentials. It only asks one
//! question per field and per nested class: "may this principal read it?".
//! Answers are computed from an [`AuthContext`] and an [`AuthPolicy`]
//! every time they are needed and are never cached per principal.

use uuid::Uuid;

/// The acting principal of a request
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid, roles: Vec<String> },

    /// Trusted in-process caller (jobs, migrations); holds every role
    System,

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Build a user principal holding the given roles
    pub fn user<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        AuthContext::User {
            user_id: Uuid::new_v4(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthContext::Anonymous)
    }

    /// Role names compare case-insensitively
    pub fn has_role(&self, role: &str) -> bool {
        match self {
            AuthContext::User { roles, .. } => roles.iter().any(|r| r.eq_ignore_ascii_case(role)),
            AuthContext::System => true,
            AuthContext::Anonymous => false,
        }
    }
}

/// Read policy attached to a property or a class
#[derive(Debug, Clone, Default)]
pub enum AuthPolicy {
    /// Readable by everyone
    #[default]
    Public,

    /// Any authenticated principal
    Authenticated,

    /// Principal must hold one of these roles
    AnyRole(Vec<String>),

    /// Only the in-process system principal
    SystemOnly,

    /// Nobody may read through the API
    Deny,

    /// Every policy must pass
    All(Vec<AuthPolicy>),

    /// At least one policy must pass
    Any(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// Shorthand for a single required role
    pub fn role(role: impl Into<String>) -> Self {
        AuthPolicy::AnyRole(vec![role.into()])
    }

    pub fn check(&self, principal: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,
            AuthPolicy::Authenticated => principal.is_authenticated(),
            AuthPolicy::AnyRole(roles) => roles.iter().any(|r| principal.has_role(r)),
            AuthPolicy::SystemOnly => matches!(principal, AuthContext::System),
            AuthPolicy::Deny => false,
            AuthPolicy::All(policies) => policies.iter().all(|p| p.check(principal)),
            AuthPolicy::Any(policies) => policies.iter().any(|p| p.check(principal)),
        }
    }
}
