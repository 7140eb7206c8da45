use crate::error::LdapError;
use std::fmt;
use url::Url;

pub const ENV_HOST: &str = "AD_HOST";
pub const ENV_PORT: &str = "AD_PORT";
pub const ENV_BIND_DN: &str = "AD_DN";
pub const ENV_BIND_PASSWORD: &str = "AD_PWD";

/// Connection details for the directory server, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct LdapConfig {
    pub url: Url,
    pub bind_dn: String,
    pub bind_password: String,
}

impl LdapConfig {
    pub fn from_env() -> Result<Self, LdapError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source. Unset and empty
    /// values are both treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LdapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| LdapError::ConfigMissing(name.to_string()))
        };

        let host = require(ENV_HOST)?;
        let port = require(ENV_PORT)?;
        let bind_dn = require(ENV_BIND_DN)?;
        let bind_password = require(ENV_BIND_PASSWORD)?;

        let port: u16 = port.trim().parse().map_err(|e| LdapError::ConfigInvalid {
            var: ENV_PORT.to_string(),
            reason: format!("{} ({})", e, port),
        })?;

        let url = Url::parse(&format!("ldap://{}:{}", host, port))
            .map_err(|e| LdapError::InvalidUrl(format!("{} ({})", e, host)))?;

        Ok(LdapConfig {
            url,
            bind_dn,
            bind_password,
        })
    }
}

impl fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapConfig")
            .field("url", &self.url.as_str())
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"<redacted>")
            .finish()
    }
}
