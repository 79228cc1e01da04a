//! Client configuration: account, credentials and base URL resolution.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_DOMAIN: &str = "test.makeplans.net";
/// `{scheme}`, `{account}` and `{domain}` are substituted.
pub const DEFAULT_URL_TEMPLATE: &str = "{scheme}://{account}.{domain}/api/v1";
pub const DEFAULT_USER_AGENT: &str = concat!("makeplans-core/", env!("CARGO_PKG_VERSION"));

pub const ACCOUNT_ENV: &str = "MAKEPLANS_ACCOUNT";
pub const TOKEN_ENV: &str = "MAKEPLANS_TOKEN";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

/// Turns a URL template and an account name into a base URL.
pub trait UrlResolver: Send + Sync {
    fn resolve(&self, template: &str, account: &str) -> String;
}

impl<F> UrlResolver for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn resolve(&self, template: &str, account: &str) -> String {
        self(template, account)
    }
}

/// Substitutes `{account}` into the template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResolver;

impl UrlResolver for TemplateResolver {
    fn resolve(&self, template: &str, account: &str) -> String {
        template.replace("{account}", account)
    }
}

/// Ignores template and account; for local and sandboxed servers.
#[derive(Debug, Clone)]
pub struct FixedResolver(pub String);

impl UrlResolver for FixedResolver {
    fn resolve(&self, _template: &str, _account: &str) -> String {
        self.0.clone()
    }
}

/// Immutable settings shared by every request a client makes.
#[derive(Clone)]
pub struct ClientConfig {
    pub account: String,
    pub token: String,
    pub scheme: String,
    pub domain: String,
    pub url_template: String,
    pub user_agent: String,
    pub resolver: Arc<dyn UrlResolver>,
}

impl ClientConfig {
    pub fn new(account: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            token: token.into(),
            scheme: DEFAULT_SCHEME.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            resolver: Arc::new(TemplateResolver),
        }
    }

    pub fn from_account(account: Account) -> Self {
        Self::new(account.name, account.token)
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_resolver(mut self, resolver: impl UrlResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Point every request at `base_url` regardless of account.
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        self.with_resolver(FixedResolver(base_url.into()))
    }

    /// Base URL with no trailing slash.
    pub fn base_url(&self) -> String {
        let template = self
            .url_template
            .replace("{scheme}", &self.scheme)
            .replace("{domain}", &self.domain);
        self.resolver
            .resolve(&template, &self.account)
            .trim_end_matches('/')
            .to_string()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("account", &self.account)
            .field("token", &"<redacted>")
            .field("scheme", &self.scheme)
            .field("domain", &self.domain)
            .field("url_template", &self.url_template)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Account credentials, usually kept in an `account.json` file.
#[derive(Clone, Deserialize)]
pub struct Account {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Token")]
    pub token: String,
}

impl Account {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Reads `MAKEPLANS_ACCOUNT` and `MAKEPLANS_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let name = lookup(ACCOUNT_ENV).ok_or(ConfigError::MissingEnv(ACCOUNT_ENV))?;
        let token = lookup(TOKEN_ENV).ok_or(ConfigError::MissingEnv(TOKEN_ENV))?;
        Ok(Self { name, token })
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .finish()
    }
}
