//! Context utilities for reading the authentication outcome of an MCP request

use rmcp::model::Extensions;

use crate::auth::AuthContext;

/// Extract the `AuthContext` attached by the auth middleware.
///
/// rmcp's streamable HTTP service stores the original `http::request::Parts`
/// in the request extensions; the middleware put the context into those
/// parts. Requests without HTTP parts (stdio) get the default non-HTTP
/// context. HTTP parts without a context fail closed.
pub fn auth_context_from_extensions(extensions: &Extensions) -> AuthContext {
    let Some(parts) = extensions.get::<http::request::Parts>() else {
        return AuthContext::default();
    };

    parts
        .extensions
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_else(|| {
            AuthContext::rejected(parts.method.as_str(), "authentication context unavailable")
        })
}
