//! Request-scoped authentication context
//!
//! Built once per request by [`AuthMiddleware`](super::AuthMiddleware) and
//! read-only afterwards. Non-HTTP transports use [`AuthContext::default`],
//! which has an empty transport method and is never subject to token checks.

/// Identity extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub display_name: String,
    pub role: String,
}

/// Outcome of authenticating a request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No authentication attempted (stdio, or no context attached)
    #[default]
    Anonymous,
    /// Authentication disabled; every request is allowed
    Bypassed,
    /// Valid, unexpired token
    Authenticated(Identity),
    /// Authentication attempted and failed
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthContext {
    transport_method: String,
    state: AuthState,
}

impl AuthContext {
    pub fn new(transport_method: impl Into<String>, state: AuthState) -> Self {
        Self {
            transport_method: transport_method.into(),
            state,
        }
    }

    pub fn authenticated(transport_method: impl Into<String>, identity: Identity) -> Self {
        Self::new(transport_method, AuthState::Authenticated(identity))
    }

    pub fn bypassed(transport_method: impl Into<String>) -> Self {
        Self::new(transport_method, AuthState::Bypassed)
    }

    pub fn rejected(transport_method: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(transport_method, AuthState::Rejected(error.into()))
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// True for a verified identity or when authentication is disabled
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self.state,
            AuthState::Authenticated(_) | AuthState::Bypassed
        )
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Subject id, empty when not authenticated with a token
    pub fn subject(&self) -> &str {
        self.identity().map(|i| i.subject_id.as_str()).unwrap_or("")
    }

    pub fn display_name(&self) -> &str {
        self.identity().map(|i| i.display_name.as_str()).unwrap_or("")
    }

    pub fn role(&self) -> &str {
        self.identity().map(|i| i.role.as_str()).unwrap_or("")
    }

    /// Failure reason, empty unless the request was rejected
    pub fn auth_error(&self) -> &str {
        match &self.state {
            AuthState::Rejected(error) => error.as_str(),
            _ => "",
        }
    }

    pub fn transport_method(&self) -> &str {
        &self.transport_method
    }

    /// HTTP requests carry their method; other transports leave it empty
    pub fn is_http(&self) -> bool {
        !self.transport_method.is_empty()
    }
}
