use reqwest_middleware::RequestBuilder;

use crate::transport::types::ApiKey;

#[derive(Clone)]
pub enum AuthStrategy {
    Bearer(ApiKey),
    None,
}

impl AuthStrategy {
    #[must_use]
    pub const fn bearer(key: ApiKey) -> Self {
        Self::Bearer(key)
    }

    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer(key) => {
                request.header("Authorization", format!("Bearer {}", key.as_str()))
            }
            Self::None => request,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        match self {
            Self::Bearer(key) => !key.is_empty(),
            Self::None => true,
        }
    }
}

impl std::fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(key) => f.debug_tuple("Bearer").field(key).finish(),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_auth_hides_key() {
        let auth = AuthStrategy::bearer(ApiKey::new("sk-test-key-123456"));
        assert!(auth.is_configured());
        let debug = format!("{auth:?}");
        assert!(debug.contains("Bearer"));
        assert!(!debug.contains("test-key-123456"));
    }

    #[test]
    fn test_empty_key_not_configured() {
        assert!(!AuthStrategy::bearer(ApiKey::new("")).is_configured());
        assert!(AuthStrategy::None.is_configured());
    }
}
