use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost/hanlim-api/controllers";
pub const DEFAULT_GATEWAY_SUFFIX: &str = ".php";

/// Literal that unlocks the delete wizard. This is a confirmation speed bump
/// for the operator, not access control; the gateway enforces nothing.
pub const DEFAULT_DELETE_PASSWORD: &str = "admin123";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub gateway_url: String,
    pub gateway_suffix: String,
    pub delete_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            gateway_suffix: DEFAULT_GATEWAY_SUFFIX.to_string(),
            delete_password: DEFAULT_DELETE_PASSWORD.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            gateway_url: lookup("GATEWAY_URL")
                .map(|value| value.trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.gateway_url),
            gateway_suffix: lookup("GATEWAY_SUFFIX").unwrap_or(defaults.gateway_suffix),
            delete_password: lookup("DELETE_PASSWORD").unwrap_or(defaults.delete_password),
        }
    }
}
