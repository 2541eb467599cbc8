use relay_core::config::{self as core_config, env_or, optional_env};
use relay_core::error::AppError;
use secrecy::Secret;

/// Public Gemini endpoint prefix.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when `GEMINI_MODEL` is unset.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-latest";

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub auth: AuthConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Shared secret expected in `x-secret-token`. `None` disables the check.
    pub secret_token: Option<Secret<String>>,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Optional at load time; the relay handler rejects requests while unset.
    pub api_key: Option<Secret<String>>,
    pub api_base: String,
    pub model: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(RelayConfig {
            common,
            auth: AuthConfig {
                secret_token: optional_env("FEISHU_SECRET").map(Secret::new),
            },
            google: GoogleConfig {
                api_key: optional_env("GOOGLE_API_KEY").map(Secret::new),
                api_base: env_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            },
        })
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.secret_token.is_some()
    }

    pub fn has_api_key(&self) -> bool {
        self.google.api_key.is_some()
    }
}
