use std::borrow::Cow;
use std::fmt;

use super::error::TransportError;

/// Secret that never shows up in `Debug` output.
#[derive(Clone)]
pub struct ApiKey(Cow<'static, str>);

impl ApiKey {
    #[must_use]
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self(key.into())
    }

    pub fn from_env(var_name: &str) -> Result<Self, TransportError> {
        std::env::var(var_name)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| Self(Cow::Owned(s)))
            .ok_or_else(|| {
                TransportError::auth_with_hint(
                    format!("Environment variable {var_name} not set"),
                    format!("Export {var_name} or set api_key_env in the config file"),
                )
            })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.0.len();
        if len > 8 {
            write!(f, "ApiKey({}...{})", &self.0[..4], &self.0[len - 3..])
        } else if len > 0 {
            write!(f, "ApiKey(***)")
        } else {
            write!(f, "ApiKey(<empty>)")
        }
    }
}

/// Service root without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Cow<'static, str>);

impl BaseUrl {
    #[must_use]
    pub fn new(url: impl Into<Cow<'static, str>>) -> Self {
        let url = url.into();
        let url = if url.ends_with('/') {
            Cow::Owned(url.trim_end_matches('/').to_string())
        } else {
            url
        };
        Self(url)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BaseUrl {
    fn from(url: &str) -> Self {
        Self::new(url.to_string())
    }
}

impl From<String> for BaseUrl {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_redacted_debug() {
        let key = ApiKey::new("sk-proj-abcdefghijklmnop");
        let debug = format!("{key:?}");
        assert!(debug.contains("sk-p"));
        assert!(debug.contains("..."));
        assert!(!debug.contains("abcdefghijklmnop"));
    }

    #[test]
    fn test_api_key_short_and_empty() {
        assert_eq!(format!("{:?}", ApiKey::new("short")), "ApiKey(***)");
        assert_eq!(format!("{:?}", ApiKey::new("")), "ApiKey(<empty>)");
    }

    #[test]
    fn test_api_key_from_env_missing() {
        let result = ApiKey::from_env("RESPSTREAM_TEST_NONEXISTENT_KEY");
        assert!(matches!(
            result,
            Err(TransportError::Authentication { hint: Some(_), .. })
        ));
    }

    #[test]
    fn test_base_url_join() {
        let url = BaseUrl::new("https://api.openai.com///");
        assert_eq!(url.as_str(), "https://api.openai.com");
        assert_eq!(
            url.join("/v1/responses"),
            "https://api.openai.com/v1/responses"
        );
    }
}
