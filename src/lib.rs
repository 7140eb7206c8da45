//! Provision LDAP directories from JSON descriptors.
//!
//! The library holds the pieces the `ldap` binary strings together: environment
//! configuration, the descriptor files, an LDAP session, and the two procedures
//! that run on it - tree/user synchronisation and subtree listing.

pub mod client;
pub mod config;
pub mod descriptor;
pub mod directory;
pub mod error;
pub mod list;
pub mod sync;

pub use tracing::{debug, error, info, trace, warn};

pub use crate::client::LdapClient;
pub use crate::config::LdapConfig;
pub use crate::descriptor::{TreeNode, UserRecord};
pub use crate::directory::{Attributes, Directory, DirectoryEntry};
pub use crate::error::{DirectoryError, LdapError};
pub use crate::list::ListedEntry;
pub use crate::sync::{DnTemplate, UserOutcome, UserResult};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn start_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
