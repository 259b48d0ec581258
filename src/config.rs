use envconfig::Envconfig;
use url::Url;

/// Origin used when `BACKEND_URL` is empty. A chat bot has no page origin to
/// fall back on, so "same origin" means the backend on the local host.
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:8000/";

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: String,

    #[envconfig(from = "BACKEND_URL", default = "")]
    pub backend_url: String,
}

impl Config {
    pub fn backend_base(&self) -> Result<Url, url::ParseError> {
        resolve_backend_base(&self.backend_url)
    }
}

/// Turns the configured prefix into a base URL that endpoint paths can be
/// joined onto. The result always ends with `/`.
pub fn resolve_backend_base(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Url::parse(DEFAULT_BACKEND_ORIGIN);
    }
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_prefix_falls_back_to_local_origin() {
        let base = resolve_backend_base("").unwrap();
        assert_eq!(base.as_str(), DEFAULT_BACKEND_ORIGIN);
    }

    #[test]
    fn keeps_path_prefix_when_joining() {
        let base = resolve_backend_base("https://api.pharmasure.test/v1").unwrap();
        assert_eq!(
            base.join("auth/login").unwrap().as_str(),
            "https://api.pharmasure.test/v1/auth/login"
        );
    }

    #[test]
    fn rejects_relative_prefix() {
        assert!(resolve_backend_base("/api").is_err());
    }

    #[test]
    fn backend_url_defaults_to_empty() {
        let env = HashMap::from([("TELEGRAM_BOT_TOKEN".to_string(), "123:abc".to_string())]);
        let config = Config::init_from_hashmap(&env).unwrap();
        assert_eq!(config.telegram_bot_token, "123:abc");
        assert_eq!(config.backend_url, "");
        assert_eq!(config.backend_base().unwrap().as_str(), DEFAULT_BACKEND_ORIGIN);
    }

    #[test]
    fn missing_bot_token_is_an_error() {
        assert!(Config::init_from_hashmap(&HashMap::new()).is_err());
    }
}
