use crate::descriptor::{TreeNode, UserRecord};
use crate::directory::{Attributes, Directory};
use crate::error::LdapError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

pub const DEFAULT_USER_DN_FORMAT: &str = "cn=%s,CN=Users,DC=global,DC=domain,DC=net";

const PLACEHOLDER: &str = "%s";

/// A user DN format containing a single `%s`, which is replaced by the username.
/// `%%` stands for a literal `%`; any other `%` sequence is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnTemplate {
    raw: String,
    prefix: String,
    suffix: String,
}

impl DnTemplate {
    pub fn new(format: &str) -> Result<Self, LdapError> {
        let invalid = || LdapError::InvalidDnFormat(format.to_string());

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut seen = false;
        let mut chars = format.chars();

        while let Some(c) = chars.next() {
            let literal = if c == '%' {
                match chars.next() {
                    Some('%') => '%',
                    Some('s') if !seen => {
                        seen = true;
                        continue;
                    }
                    _ => return Err(invalid()),
                }
            } else {
                c
            };
            if seen {
                suffix.push(literal);
            } else {
                prefix.push(literal);
            }
        }

        if !seen {
            return Err(invalid());
        }
        Ok(DnTemplate {
            raw: format.to_string(),
            prefix,
            suffix,
        })
    }

    pub fn format(&self, username: &str) -> String {
        format!("{}{}{}", self.prefix, username, self.suffix)
    }
}

impl Default for DnTemplate {
    fn default() -> Self {
        let (prefix, suffix) = DEFAULT_USER_DN_FORMAT
            .split_once(PLACEHOLDER)
            .unwrap_or((DEFAULT_USER_DN_FORMAT, ""));
        DnTemplate {
            raw: DEFAULT_USER_DN_FORMAT.to_string(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }
}

impl FromStr for DnTemplate {
    type Err = LdapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DnTemplate::new(s)
    }
}

impl fmt::Display for DnTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UserOutcome {
    Created,
    Updated,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResult {
    pub username: String,
    pub dn: String,
    pub outcome: UserOutcome,
}

/// Add every node in order. The first rejected add stops the run.
pub async fn create_tree<D>(dir: &mut D, nodes: &[TreeNode]) -> Result<(), LdapError>
where
    D: Directory + ?Sized,
{
    for node in nodes {
        debug!(dn = %node.dn, "Adding tree entry");
        if let Err(e) = dir.add(&node.dn, &node.attributes).await {
            error!(dn = %node.dn, error = %e, "Failed to add tree entry");
            return Err(LdapError::TreeCreate {
                dn: node.dn.clone(),
                reason: e.to_string(),
            });
        }
    }

    info!(count = nodes.len(), "LDAP tree creation successful");
    Ok(())
}

fn single(value: &str) -> Vec<String> {
    vec![value.to_string()]
}

/// The attributes that are rewritten when the user already exists.
fn user_replace_attributes(user: &UserRecord) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("cn".to_string(), single(&user.display_name));
    attrs.insert("sn".to_string(), single(&user.display_name));
    attrs.insert("userPassword".to_string(), single(&user.password));
    attrs
}

fn user_add_attributes(user: &UserRecord) -> Attributes {
    let mut attrs = user_replace_attributes(user);
    attrs.insert(
        "objectClass".to_string(),
        vec!["top".to_string(), "person".to_string()],
    );
    attrs
}

/// Create or update each user, in order.
///
/// An add rejected because the entry exists falls back to replacing `cn`, `sn`
/// and `userPassword`; if that modify fails the user is recorded as failed and
/// processing continues. Any other add failure aborts the batch, and the error
/// carries the results recorded up to and including the failing user.
pub async fn sync_users<D>(
    dir: &mut D,
    users: &[UserRecord],
    template: &DnTemplate,
) -> Result<Vec<UserResult>, LdapError>
where
    D: Directory + ?Sized,
{
    let mut results = Vec::with_capacity(users.len());

    for user in users {
        let dn = template.format(&user.username);

        if user.username.is_empty() {
            warn!(user = %user.display_name, "Skipping user with empty username");
            results.push(UserResult {
                username: user.username.clone(),
                dn,
                outcome: UserOutcome::Failed("empty username".to_string()),
            });
            continue;
        }

        let outcome = match dir.add(&dn, &user_add_attributes(user)).await {
            Ok(()) => {
                info!(user = %user.display_name, dn = %dn, "Successfully added user");
                UserOutcome::Created
            }
            Err(e) if e.is_already_exists() => {
                info!(user = %user.display_name, dn = %dn, "User already exists, updating");
                match dir.modify_replace(&dn, &user_replace_attributes(user)).await {
                    Ok(()) => {
                        info!(user = %user.display_name, dn = %dn, "Successfully updated user");
                        UserOutcome::Updated
                    }
                    Err(e) => {
                        warn!(user = %user.display_name, dn = %dn, error = %e, "Failed to update user");
                        UserOutcome::Failed(e.to_string())
                    }
                }
            }
            Err(e) => {
                error!(user = %user.display_name, dn = %dn, error = %e, "Failed to add user");
                let reason = e.to_string();
                results.push(UserResult {
                    username: user.username.clone(),
                    dn: dn.clone(),
                    outcome: UserOutcome::Failed(reason.clone()),
                });
                return Err(LdapError::UserAdd {
                    dn,
                    reason,
                    results,
                });
            }
        };

        results.push(UserResult {
            username: user.username.clone(),
            dn,
            outcome,
        });
    }

    Ok(results)
}

/// Build the tree, then upsert the users into it.
pub async fn synchronise<D>(
    dir: &mut D,
    nodes: &[TreeNode],
    users: &[UserRecord],
    template: &DnTemplate,
) -> Result<Vec<UserResult>, LdapError>
where
    D: Directory + ?Sized,
{
    create_tree(dir, nodes).await?;
    sync_users(dir, users, template).await
}

/// Run [`synchronise`] on an owned session, closing it on every outcome.
pub async fn provision<D>(
    mut dir: D,
    nodes: &[TreeNode],
    users: &[UserRecord],
    template: &DnTemplate,
) -> Result<Vec<UserResult>, LdapError>
where
    D: Directory,
{
    let res = synchronise(&mut dir, nodes, users, template).await;
    dir.close().await;
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_formats_username() {
        assert_eq!(
            DnTemplate::default().format("alice"),
            "cn=alice,CN=Users,DC=global,DC=domain,DC=net"
        );
    }

    #[test]
    fn template_requires_one_placeholder() {
        assert!(DnTemplate::new("cn=fixed,DC=global").is_err());
        assert!(DnTemplate::new("cn=%s,ou=%s,DC=global").is_err());
        assert_eq!(
            "uid=%s,OU=People,DC=example".parse::<DnTemplate>().unwrap().format("bob"),
            "uid=bob,OU=People,DC=example"
        );
    }

    #[test]
    fn default_matches_parsed_default_format() {
        assert_eq!(
            DnTemplate::new(DEFAULT_USER_DN_FORMAT).unwrap(),
            DnTemplate::default()
        );
        assert_eq!(DnTemplate::default().to_string(), DEFAULT_USER_DN_FORMAT);
    }

    #[test]
    fn double_percent_is_a_literal() {
        let template = DnTemplate::new("cn=%%s,%s").unwrap();
        assert_eq!(template.format("alice"), "cn=%s,alice");
        assert_eq!(template.to_string(), "cn=%%s,%s");

        assert_eq!(
            DnTemplate::new("cn=%s,o=100%%").unwrap().format("bob"),
            "cn=bob,o=100%"
        );
        assert!(DnTemplate::new("cn=%%s").is_err());
        assert!(DnTemplate::new("cn=%d,%s").is_err());
        assert!(DnTemplate::new("cn=%s,%").is_err());
    }

    #[test]
    fn replace_set_excludes_object_class() {
        let user = UserRecord {
            display_name: "Alice A".to_string(),
            password: "p1".to_string(),
            organizational_unit: "X".to_string(),
            username: "alice".to_string(),
        };
        let replace = user_replace_attributes(&user);
        assert_eq!(
            replace.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["cn", "sn", "userPassword"]
        );
        assert_eq!(
            user_add_attributes(&user)["objectClass"],
            vec!["top".to_string(), "person".to_string()]
        );
    }
}
