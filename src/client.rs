use crate::config::LdapConfig;
use crate::directory::{Attributes, Directory, DirectoryEntry, EntryStream};
use crate::error::{DirectoryError, LdapError};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use ldap3::{Ldap, LdapConnAsync, Mod, Scope, SearchEntry};
use std::collections::HashSet;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// An open, bound LDAP session. Call [`Directory::close`] when done; dropping the
/// client without closing it still tears down the connection driver.
pub struct LdapClient {
    ldap: Ldap,
    driver: Option<JoinHandle<()>>,
}

impl LdapClient {
    pub async fn connect(config: &LdapConfig) -> Result<Self, LdapError> {
        debug!(url = %config.url, "Connecting to LDAP server");

        let (conn, ldap) = LdapConnAsync::new(config.url.as_str())
            .await
            .map_err(|e| LdapError::ConnectError(e.to_string()))?;

        let driver = tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let mut client = LdapClient {
            ldap,
            driver: Some(driver),
        };

        debug!(bind_dn = %config.bind_dn, "Performing LDAP bind");
        let bound = client
            .ldap
            .simple_bind(&config.bind_dn, &config.bind_password)
            .await
            .and_then(|res| res.success());

        if let Err(e) = bound {
            client.close().await;
            return Err(LdapError::BindError(DirectoryError::from(e).to_string()));
        }

        info!(url = %config.url, "LDAP connection established");
        Ok(client)
    }
}

impl Drop for LdapClient {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

fn to_value_sets(attrs: &Attributes) -> Vec<(&str, HashSet<&str>)> {
    attrs
        .iter()
        .map(|(name, vals)| (name.as_str(), vals.iter().map(String::as_str).collect()))
        .collect()
}

impl From<SearchEntry> for DirectoryEntry {
    fn from(entry: SearchEntry) -> Self {
        DirectoryEntry {
            dn: entry.dn,
            attributes: entry.attrs.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Directory for LdapClient {
    async fn add(&mut self, dn: &str, attrs: &Attributes) -> Result<(), DirectoryError> {
        self.ldap.add(dn, to_value_sets(attrs)).await?.success()?;
        Ok(())
    }

    async fn modify_replace(
        &mut self,
        dn: &str,
        attrs: &Attributes,
    ) -> Result<(), DirectoryError> {
        let mods: Vec<Mod<&str>> = to_value_sets(attrs)
            .into_iter()
            .map(|(name, vals)| Mod::Replace(name, vals))
            .collect();
        self.ldap.modify(dn, mods).await?.success()?;
        Ok(())
    }

    async fn search_subtree(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<EntryStream, DirectoryError> {
        let attrs: Vec<String> = attrs.iter().map(|a| a.to_string()).collect();
        let search = self
            .ldap
            .streaming_search(base, Scope::Subtree, filter, attrs)
            .await?;

        // Entries are pulled from the connection one at a time as the caller polls.
        let entries = stream::unfold(Some(search), |state| async move {
            let mut search = state?;
            match search.next().await {
                Ok(Some(entry)) => {
                    let entry = DirectoryEntry::from(SearchEntry::construct(entry));
                    Some((Ok(entry), Some(search)))
                }
                Ok(None) => match search.finish().await.success() {
                    Ok(_) => None,
                    Err(e) => Some((Err(DirectoryError::from(e)), None)),
                },
                Err(e) => Some((Err(DirectoryError::from(e)), None)),
            }
        });

        Ok(entries.boxed())
    }

    async fn close(&mut self) {
        if let Err(e) = self.ldap.unbind().await {
            debug!(error = %e, "LDAP unbind failed");
        }
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}
