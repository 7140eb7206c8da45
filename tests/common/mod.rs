#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use ldapprov::directory::EntryStream;
use ldapprov::{Attributes, Directory, DirectoryEntry, DirectoryError, UserRecord};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Add { dn: String, attrs: Attributes },
    Modify { dn: String, attrs: Attributes },
    Search {
        base: String,
        filter: String,
        attrs: Vec<String>,
    },
    Close,
}

/// Records every request and answers from scripted replies. Once a reply queue
/// is empty every further request of that kind succeeds.
#[derive(Default)]
pub struct RecordingDirectory {
    pub requests: Vec<Request>,
    pub add_replies: VecDeque<Result<(), DirectoryError>>,
    pub modify_replies: VecDeque<Result<(), DirectoryError>>,
    pub entries: Vec<Result<DirectoryEntry, DirectoryError>>,
    pub search_error: Option<DirectoryError>,
}

impl RecordingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_adds_with(reply: DirectoryError, count: usize) -> Self {
        let mut dir = Self::new();
        dir.add_replies = std::iter::repeat(Err(reply)).take(count).collect();
        dir
    }

    pub fn adds(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                Request::Add { dn, .. } => Some(dn.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| **r == Request::Close)
            .count()
    }

    pub fn modifies(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                Request::Modify { dn, .. } => Some(dn.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Directory for RecordingDirectory {
    async fn add(&mut self, dn: &str, attrs: &Attributes) -> Result<(), DirectoryError> {
        self.requests.push(Request::Add {
            dn: dn.to_string(),
            attrs: attrs.clone(),
        });
        self.add_replies.pop_front().unwrap_or(Ok(()))
    }

    async fn modify_replace(
        &mut self,
        dn: &str,
        attrs: &Attributes,
    ) -> Result<(), DirectoryError> {
        self.requests.push(Request::Modify {
            dn: dn.to_string(),
            attrs: attrs.clone(),
        });
        self.modify_replies.pop_front().unwrap_or(Ok(()))
    }

    async fn search_subtree(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<EntryStream, DirectoryError> {
        self.requests.push(Request::Search {
            base: base.to_string(),
            filter: filter.to_string(),
            attrs: attrs.iter().map(|a| a.to_string()).collect(),
        });
        if let Some(e) = self.search_error.clone() {
            return Err(e);
        }
        Ok(stream::iter(self.entries.clone()).boxed())
    }

    async fn close(&mut self) {
        self.requests.push(Request::Close);
    }
}

pub fn values(vals: &[&str]) -> Vec<String> {
    vals.iter().map(|v| v.to_string()).collect()
}

pub fn user(username: &str, display_name: &str, password: &str) -> UserRecord {
    UserRecord {
        display_name: display_name.to_string(),
        password: password.to_string(),
        organizational_unit: "X".to_string(),
        username: username.to_string(),
    }
}
