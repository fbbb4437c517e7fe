//! # Session Context
//!
//! The session-scoped request context (auth token, active company) injected
//! by the suite shell. The sync client treats it as an externally
//! synchronized, read-only value: it is applied to every outgoing request
//! and never mutated here. Acquiring, refreshing and storing the token all
//! belong to the shell's auth layer.

/// Injected per-session request context.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    bearer_token: Option<String>,
    company_id: Option<String>,
}

impl SessionContext {
    /// Context with no auth and no company scope (anonymous gateway access).
    pub fn new() -> Self {
        SessionContext::default()
    }

    /// Attaches a bearer token sent as `Authorization: Bearer …`.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Attaches the active company/tenant scope sent as `x-company-id`.
    pub fn with_company_id(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    /// Whether a bearer token is present.
    pub fn is_authenticated(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Applies the context headers to an outgoing request.
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut request = request;
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(company) = &self.company_id {
            request = request.header("x-company-id", company);
        }
        request
    }
}
