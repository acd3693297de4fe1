// src/storage/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{IdentityStore, Result, StorageError};
use crate::core::identity::types::{AttemptRecord, IdentityHandle, IdentityRecord, StoredTemplate};

#[derive(Default)]
struct Tables {
    identities: Vec<IdentityRecord>,
    by_username: HashMap<String, usize>,
    by_email: HashMap<String, usize>,
    templates: HashMap<IdentityHandle, Vec<StoredTemplate>>,
    attempts: HashMap<IdentityHandle, Vec<AttemptRecord>>,
}

impl Tables {
    fn ensure_known(&self, identity: &IdentityHandle) -> Result<()> {
        if self.identities.iter().any(|record| &record.handle == identity) {
            Ok(())
        } else {
            Err(StorageError::UnknownIdentity(identity.to_string()))
        }
    }
}

/// Process-local store. Contents are lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_identity(&self, username: &str, email: &str) -> Result<IdentityRecord> {
        let mut tables = self.tables.write();

        if tables.by_username.contains_key(username) {
            return Err(StorageError::Duplicate {
                field: "username",
                value: username.to_string(),
            });
        }
        if tables.by_email.contains_key(email) {
            return Err(StorageError::Duplicate {
                field: "email",
                value: email.to_string(),
            });
        }

        let record = IdentityRecord::new(username, email);
        let index = tables.identities.len();
        tables.identities.push(record.clone());
        tables.by_username.insert(username.to_string(), index);
        tables.by_email.insert(email.to_string(), index);

        Ok(record)
    }

    async fn lookup_identity(&self, username: &str) -> Result<Option<IdentityRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .by_username
            .get(username)
            .and_then(|&index| tables.identities.get(index))
            .cloned())
    }

    async fn store_template(
        &self,
        identity: IdentityHandle,
        hash: &str,
        serialized_vector: &str,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        tables.ensure_known(&identity)?;

        tables.templates.entry(identity).or_default().push(StoredTemplate {
            identity,
            hash: hash.to_string(),
            serialized_vector: serialized_vector.to_string(),
            enrolled_at: Utc::now(),
        });
        Ok(())
    }

    async fn fetch_templates(&self, identity: IdentityHandle) -> Result<Vec<StoredTemplate>> {
        let tables = self.tables.read();
        Ok(tables.templates.get(&identity).cloned().unwrap_or_default())
    }

    async fn append_attempt(
        &self,
        identity: IdentityHandle,
        success: bool,
        match_percentage: Option<f64>,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        tables.ensure_known(&identity)?;

        tables.attempts.entry(identity).or_default().push(AttemptRecord {
            identity,
            timestamp: Utc::now(),
            success,
            match_percentage,
        });
        Ok(())
    }

    async fn fetch_attempts(&self, identity: IdentityHandle, limit: usize) -> Result<Vec<AttemptRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .attempts
            .get(&identity)
            .map(|log| log.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_identities(&self) -> Result<Vec<(IdentityHandle, String)>> {
        let tables = self.tables.read();
        Ok(tables
            .identities
            .iter()
            .map(|record| (record.handle, record.username.clone()))
            .collect())
    }
}
