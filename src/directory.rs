//! The operations a directory session has to offer. [`crate::client::LdapClient`]
//! is the real implementation; tests supply in-memory ones.

use crate::error::DirectoryError;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::collections::BTreeMap;

/// Attribute name to its ordered values.
pub type Attributes = BTreeMap<String, Vec<String>>;

/// One entry returned by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: Attributes,
}

impl DirectoryEntry {
    /// First value of `attr`, mirroring how single-valued lookups behave in most
    /// LDAP tooling.
    pub fn first_value(&self, attr: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(attr))
            .and_then(|(_, v)| v.first())
            .map(String::as_str)
    }
}

/// Entries in the order the server sends them. Not restartable.
pub type EntryStream = BoxStream<'static, Result<DirectoryEntry, DirectoryError>>;

#[async_trait]
pub trait Directory: Send {
    /// Create `dn` with the given attributes.
    async fn add(&mut self, dn: &str, attrs: &Attributes) -> Result<(), DirectoryError>;

    /// Replace every attribute in `attrs` on the existing entry `dn`.
    async fn modify_replace(&mut self, dn: &str, attrs: &Attributes)
        -> Result<(), DirectoryError>;

    async fn search_subtree(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<EntryStream, DirectoryError>;

    /// Release the session. Called once at the end of a run, on success and
    /// failure alike; no requests follow it.
    async fn close(&mut self);
}

#[async_trait]
impl<'a, T> Directory for &'a mut T
where
    T: Directory + ?Sized,
{
    async fn add(&mut self, dn: &str, attrs: &Attributes) -> Result<(), DirectoryError> {
        (**self).add(dn, attrs).await
    }

    async fn modify_replace(
        &mut self,
        dn: &str,
        attrs: &Attributes,
    ) -> Result<(), DirectoryError> {
        (**self).modify_replace(dn, attrs).await
    }

    async fn search_subtree(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<EntryStream, DirectoryError> {
        (**self).search_subtree(base, filter, attrs).await
    }

    async fn close(&mut self) {
        (**self).close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_ignores_attribute_case() {
        let mut attributes = Attributes::new();
        attributes.insert(
            "objectclass".to_string(),
            vec!["top".to_string(), "person".to_string()],
        );
        let entry = DirectoryEntry {
            dn: "cn=alice,DC=global".to_string(),
            attributes,
        };
        assert_eq!(entry.first_value("objectClass"), Some("top"));
        assert_eq!(entry.first_value("cn"), None);
    }
}
