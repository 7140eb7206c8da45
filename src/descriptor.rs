//! JSON descriptor files: the organisational tree to create and the users to
//! provision into it.

use crate::directory::Attributes;
use crate::error::LdapError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_TREE_FILE: &str = "tree.json";
pub const DEFAULT_USERS_FILE: &str = "users.json";

// Keys also match in their capitalised form, and `ou`/`attributes` may be left out.

/// An organisational entry to create, exactly as given in the tree file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(alias = "DN", alias = "Dn")]
    pub dn: String,
    #[serde(default, alias = "Attributes")]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "user", alias = "User")]
    pub display_name: String,
    #[serde(alias = "Password")]
    pub password: String,
    #[serde(rename = "ou", default, alias = "Ou", alias = "OU")]
    pub organizational_unit: String,
    #[serde(alias = "Username")]
    pub username: String,
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, LdapError> {
    let data = fs::read(path).map_err(|e| LdapError::DescriptorRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&data).map_err(|e| LdapError::DescriptorParse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_tree(path: &Path) -> Result<Vec<TreeNode>, LdapError> {
    let nodes: Vec<TreeNode> = load(path)?;
    debug!(path = %path.display(), count = nodes.len(), "Loaded tree descriptor");
    Ok(nodes)
}

pub fn load_users(path: &Path) -> Result<Vec<UserRecord>, LdapError> {
    let users: Vec<UserRecord> = load(path)?;
    debug!(path = %path.display(), count = users.len(), "Loaded users descriptor");
    Ok(users)
}

pub fn default_users() -> Vec<UserRecord> {
    vec![
        UserRecord {
            display_name: "User 1".to_string(),
            password: "passwd".to_string(),
            organizational_unit: "Operations".to_string(),
            username: "user1".to_string(),
        },
        UserRecord {
            display_name: "User 2".to_string(),
            password: "passwd".to_string(),
            organizational_unit: "Development".to_string(),
            username: "user2".to_string(),
        },
    ]
}

pub fn default_tree() -> Vec<TreeNode> {
    let mut attributes = Attributes::new();
    attributes.insert(
        "objectClass".to_string(),
        vec!["top".to_string(), "organizationalPerson".to_string()],
    );
    attributes.insert("cn".to_string(), vec!["Users".to_string()]);

    vec![TreeNode {
        dn: "CN=Users,DC=global,DC=domain,DC=net".to_string(),
        attributes,
    }]
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), LdapError> {
    let to_err = |reason: String| LdapError::DescriptorWrite {
        path: path.display().to_string(),
        reason,
    };
    let mut data = serde_json::to_vec_pretty(value).map_err(|e| to_err(e.to_string()))?;
    data.push(b'\n');
    fs::write(path, data).map_err(|e| to_err(e.to_string()))
}

/// Write template `users.json` and `tree.json` into `dir`, replacing any existing
/// files. Returns the paths written.
pub fn write_default_files(dir: &Path) -> Result<Vec<PathBuf>, LdapError> {
    let users_path = dir.join(DEFAULT_USERS_FILE);
    let tree_path = dir.join(DEFAULT_TREE_FILE);

    write_json(&users_path, &default_users())?;
    write_json(&tree_path, &default_tree())?;

    info!(dir = %dir.display(), "Wrote default descriptor files");
    Ok(vec![users_path, tree_path])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_uses_descriptor_keys() {
        let users: Vec<UserRecord> = serde_json::from_str(
            r#"[{"username":"alice","user":"Alice A","password":"p1","ou":"X"}]"#,
        )
        .unwrap();
        assert_eq!(
            users,
            vec![UserRecord {
                display_name: "Alice A".to_string(),
                password: "p1".to_string(),
                organizational_unit: "X".to_string(),
                username: "alice".to_string(),
            }]
        );
    }

    #[test]
    fn tree_node_parses_multi_valued_attributes() {
        let nodes: Vec<TreeNode> = serde_json::from_str(
            r#"[{"dn":"OU=Ops,DC=global","attributes":{"objectClass":["top","organizationalUnit"],"ou":["Ops"]}}]"#,
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].dn, "OU=Ops,DC=global");
        assert_eq!(
            nodes[0].attributes["objectClass"],
            vec!["top".to_string(), "organizationalUnit".to_string()]
        );
    }

    #[test]
    fn user_without_ou_loads() {
        let users: Vec<UserRecord> =
            serde_json::from_str(r#"[{"user":"Alice A","password":"p1","username":"alice"}]"#)
                .unwrap();
        assert_eq!(users[0].organizational_unit, "");
        assert_eq!(users[0].username, "alice");
    }

    #[test]
    fn capitalised_keys_are_accepted() {
        let users: Vec<UserRecord> = serde_json::from_str(
            r#"[{"User":"Alice A","Password":"p1","Ou":"X","Username":"alice"}]"#,
        )
        .unwrap();
        assert_eq!(users[0].display_name, "Alice A");
        assert_eq!(users[0].password, "p1");
        assert_eq!(users[0].organizational_unit, "X");

        let nodes: Vec<TreeNode> =
            serde_json::from_str(r#"[{"DN":"OU=Ops,DC=global","Attributes":{"ou":["Ops"]}}]"#)
                .unwrap();
        assert_eq!(nodes[0].dn, "OU=Ops,DC=global");
        assert_eq!(nodes[0].attributes["ou"], vec!["Ops".to_string()]);
    }

    #[test]
    fn user_without_username_is_rejected() {
        let res: Result<Vec<UserRecord>, _> =
            serde_json::from_str(r#"[{"user":"Alice A","password":"p1","ou":"X"}]"#);
        assert!(res.is_err());
    }
}
