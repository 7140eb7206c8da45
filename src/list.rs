use crate::directory::{Directory, DirectoryEntry};
use crate::error::LdapError;
use futures_util::stream::{BoxStream, StreamExt};
use serde::Serialize;
use std::fmt;
use tracing::debug;

pub const DEFAULT_SEARCH_BASE: &str = "DC=global,DC=domain,DC=net";

const MATCH_ALL: &str = "(objectClass=*)";
const LIST_ATTRS: &[&str] = &["dn", "objectClass"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedEntry {
    pub dn: String,
    /// First objectClass value the server returned, empty if none.
    pub object_class: String,
}

impl From<DirectoryEntry> for ListedEntry {
    fn from(entry: DirectoryEntry) -> Self {
        let object_class = entry.first_value("objectClass").unwrap_or_default().to_string();
        ListedEntry {
            dn: entry.dn,
            object_class,
        }
    }
}

impl fmt::Display for ListedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.dn, self.object_class)
    }
}

/// Everything at or below `base`, in server order.
pub async fn list_entries<D>(
    dir: &mut D,
    base: &str,
) -> Result<BoxStream<'static, Result<ListedEntry, LdapError>>, LdapError>
where
    D: Directory + ?Sized,
{
    debug!(base = %base, "Searching directory subtree");
    let entries = dir
        .search_subtree(base, MATCH_ALL, LIST_ATTRS)
        .await
        .map_err(|e| LdapError::SearchError(e.to_string()))?;

    Ok(entries
        .map(|res| {
            res.map(ListedEntry::from)
                .map_err(|e| LdapError::SearchError(e.to_string()))
        })
        .boxed())
}

async fn drain<D, F>(dir: &mut D, base: &str, visit: &mut F) -> Result<usize, LdapError>
where
    D: Directory + ?Sized,
    F: FnMut(&ListedEntry),
{
    let mut entries = list_entries(dir, base).await?;
    let mut count = 0;
    while let Some(entry) = entries.next().await {
        visit(&entry?);
        count += 1;
    }
    Ok(count)
}

/// Pass every entry below `base` to `visit`, then close the session whether or
/// not the search succeeded. Returns the number of entries visited.
pub async fn visit_entries<D, F>(mut dir: D, base: &str, mut visit: F) -> Result<usize, LdapError>
where
    D: Directory,
    F: FnMut(&ListedEntry),
{
    let res = drain(&mut dir, base, &mut visit).await;
    dir.close().await;
    res
}
