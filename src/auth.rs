/// Bearer-token gate in front of every route except the health check.
#[derive(Debug, Clone)]
pub struct AuthGate {
    token: String,
    exempt_prefix: String,
}

impl AuthGate {
    pub const HEALTH_PREFIX: &'static str = "/health";

    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            exempt_prefix: Self::HEALTH_PREFIX.to_string(),
        }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        path.starts_with(&self.exempt_prefix)
    }

    /// Check an `Authorization` header value.
    ///
    /// A missing header, another scheme, and a wrong token are all just `false`.
    pub fn authorize(&self, credential: Option<&str>) -> bool {
        credential
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token == self.token)
            .unwrap_or(false)
    }
}
