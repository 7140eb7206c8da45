use crate::sync::UserResult;
use serde::Serialize;
use std::fmt;

/// LDAP result code for entryAlreadyExists (RFC 4511).
pub const RC_ENTRY_ALREADY_EXISTS: u32 = 68;

/// A failure reported by a directory operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The server answered with a non-success result code.
    Result { code: u32, text: String },
    /// The request never produced a result (connection dropped, protocol fault).
    Transport(String),
}

impl DirectoryError {
    pub fn result(code: u32, text: impl Into<String>) -> Self {
        DirectoryError::Result {
            code,
            text: text.into(),
        }
    }

    pub fn already_exists() -> Self {
        DirectoryError::result(RC_ENTRY_ALREADY_EXISTS, "entry already exists")
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            DirectoryError::Result {
                code: RC_ENTRY_ALREADY_EXISTS,
                ..
            }
        )
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // An empty diagnostic from the server still needs to say something.
            DirectoryError::Result { code, text } if text.is_empty() => {
                write!(f, "ldap result code {}", code)
            }
            DirectoryError::Result { text, .. } => write!(f, "{}", text),
            DirectoryError::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for DirectoryError {}

impl From<ldap3::LdapError> for DirectoryError {
    fn from(e: ldap3::LdapError) -> Self {
        match e {
            ldap3::LdapError::LdapResult { result } => DirectoryError::Result {
                code: result.rc,
                text: result.text,
            },
            other => DirectoryError::Transport(other.to_string()),
        }
    }
}

/// Every way a run of the `ldap` utility can fail. The binary prints the error
/// (as text, or JSON with `--json`) and exits with [`LdapError::exit_code`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LdapError {
    ConfigMissing(String),
    ConfigInvalid { var: String, reason: String },
    InvalidUrl(String),
    InvalidDnFormat(String),
    ConnectError(String),
    BindError(String),
    DescriptorRead { path: String, reason: String },
    DescriptorParse { path: String, reason: String },
    DescriptorWrite { path: String, reason: String },
    TreeCreate { dn: String, reason: String },
    /// Fatal user add. `results` holds every user outcome recorded before the
    /// abort, ending with the failing user.
    UserAdd {
        dn: String,
        reason: String,
        results: Vec<UserResult>,
    },
    SearchError(String),
}

impl LdapError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LdapError::ConfigMissing(_) => -1,
            LdapError::ConfigInvalid { .. } => -2,
            LdapError::InvalidUrl(_) => -3,
            LdapError::InvalidDnFormat(_) => -4,
            LdapError::ConnectError(_) => -5,
            LdapError::BindError(_) => -6,
            LdapError::DescriptorRead { .. } => -7,
            LdapError::DescriptorParse { .. } => -8,
            LdapError::DescriptorWrite { .. } => -9,
            LdapError::TreeCreate { .. } => -10,
            LdapError::UserAdd { .. } => -11,
            LdapError::SearchError(_) => -12,
        }
    }
}

impl fmt::Display for LdapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LdapError::ConfigMissing(var) => {
                write!(f, "Environment variable {} is not set", var)
            }
            LdapError::ConfigInvalid { var, reason } => {
                write!(f, "Environment variable {} is invalid: {}", var, reason)
            }
            LdapError::InvalidUrl(reason) => write!(f, "Invalid LDAP server url: {}", reason),
            LdapError::InvalidDnFormat(fmt) => write!(
                f,
                "Invalid user DN format '{}': expected exactly one %s placeholder (%% for a literal %)",
                fmt
            ),
            LdapError::ConnectError(reason) => {
                write!(f, "Failed to connect to LDAP server: {}", reason)
            }
            LdapError::BindError(reason) => write!(f, "Failed to bind to LDAP server: {}", reason),
            LdapError::DescriptorRead { path, reason } => {
                write!(f, "Failed to read JSON file {}: {}", path, reason)
            }
            LdapError::DescriptorParse { path, reason } => {
                write!(f, "Failed to unmarshal JSON in {}: {}", path, reason)
            }
            LdapError::DescriptorWrite { path, reason } => {
                write!(f, "Failed to create {} file: {}", path, reason)
            }
            LdapError::TreeCreate { dn, reason } => {
                write!(f, "Failed to add entry {} to LDAP server: {}", dn, reason)
            }
            LdapError::UserAdd { dn, reason, .. } => write!(f, "Failed to add user {}: {}", dn, reason),
            LdapError::SearchError(reason) => {
                write!(f, "Failed to perform LDAP search: {}", reason)
            }
        }
    }
}

impl std::error::Error for LdapError {}
