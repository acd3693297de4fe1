// src/storage/rocks.rs
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use super::{IdentityStore, Result, StorageError};
use crate::core::identity::types::{AttemptRecord, IdentityHandle, IdentityRecord, StoredTemplate};

const SEQUENCE_KEY: &str = "meta:sequence";

/// RocksDB-backed store. Values are JSON; templates and attempts are keyed by
/// a store-wide monotonic sequence so prefix scans return insertion order.
pub struct RocksStore {
    db: DB,
    // Serializes writes: uniqueness checks and sequence allocation.
    sequence: Mutex<u64>,
}

impl RocksStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create directory if it doesn't exist
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_keep_log_file_num(10);
        opts.set_max_open_files(1000);

        let db = DB::open(&opts, path)
            .map_err(|e| StorageError::DatabaseError(format!("Failed to open database: {}", e)))?;

        let sequence: u64 = match db
            .get(SEQUENCE_KEY.as_bytes())
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?
        {
            Some(raw) => serde_json::from_slice(&raw)?,
            None => 0,
        };

        info!("Opened identity store at {:?} (sequence {})", path, sequence);
        Ok(Self {
            db,
            sequence: Mutex::new(sequence),
        })
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = match self
            .db
            .get(key.as_bytes())
            .map_err(|e| StorageError::DatabaseError(format!("Database read failed: {}", e)))?
        {
            Some(data) => data,
            None => return Ok(None),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn put_sequenced<T: Serialize>(&self, prefix: &str, value: &T) -> Result<()> {
        let mut sequence = self.sequence.lock();
        let next = *sequence + 1;

        let mut batch = WriteBatch::default();
        batch.put(format!("{}{:020}", prefix, next).as_bytes(), serde_json::to_vec(value)?);
        batch.put(SEQUENCE_KEY.as_bytes(), serde_json::to_vec(&next)?);
        self.db
            .write(batch)
            .map_err(|e| StorageError::DatabaseError(format!("Batch write failed: {}", e)))?;

        *sequence = next;
        Ok(())
    }

    fn scan<T: DeserializeOwned>(&self, prefix: &str, mode: IteratorMode, limit: usize) -> Result<Vec<T>> {
        let mut values = Vec::new();
        for item in self.db.iterator(mode) {
            if values.len() >= limit {
                break;
            }
            let (key, value) = item.map_err(|e| StorageError::DatabaseError(e.to_string()))?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn ensure_known(&self, identity: &IdentityHandle) -> Result<()> {
        match self.get::<String>(&identity_key(identity))? {
            Some(_) => Ok(()),
            None => Err(StorageError::UnknownIdentity(identity.to_string())),
        }
    }
}

fn user_key(username: &str) -> String {
    format!("user:{}", username)
}

fn email_key(email: &str) -> String {
    format!("email:{}", email)
}

fn identity_key(identity: &IdentityHandle) -> String {
    format!("identity:{}", identity)
}

fn template_prefix(identity: &IdentityHandle) -> String {
    format!("template:{}:", identity)
}

fn attempt_prefix(identity: &IdentityHandle) -> String {
    format!("attempt:{}:", identity)
}

#[async_trait]
impl IdentityStore for RocksStore {
    async fn create_identity(&self, username: &str, email: &str) -> Result<IdentityRecord> {
        let _guard = self.sequence.lock();

        if self.get::<IdentityRecord>(&user_key(username))?.is_some() {
            return Err(StorageError::Duplicate {
                field: "username",
                value: username.to_string(),
            });
        }
        if self.get::<String>(&email_key(email))?.is_some() {
            return Err(StorageError::Duplicate {
                field: "email",
                value: email.to_string(),
            });
        }

        let record = IdentityRecord::new(username, email);
        let mut batch = WriteBatch::default();
        batch.put(user_key(username).as_bytes(), serde_json::to_vec(&record)?);
        batch.put(email_key(email).as_bytes(), serde_json::to_vec(&record.handle)?);
        batch.put(identity_key(&record.handle).as_bytes(), serde_json::to_vec(username)?);
        self.db
            .write(batch)
            .map_err(|e| StorageError::DatabaseError(format!("Identity write failed: {}", e)))?;

        Ok(record)
    }

    async fn lookup_identity(&self, username: &str) -> Result<Option<IdentityRecord>> {
        self.get(&user_key(username))
    }

    async fn store_template(
        &self,
        identity: IdentityHandle,
        hash: &str,
        serialized_vector: &str,
    ) -> Result<()> {
        self.ensure_known(&identity)?;
        let template = StoredTemplate {
            identity,
            hash: hash.to_string(),
            serialized_vector: serialized_vector.to_string(),
            enrolled_at: Utc::now(),
        };
        self.put_sequenced(&template_prefix(&identity), &template)
    }

    async fn fetch_templates(&self, identity: IdentityHandle) -> Result<Vec<StoredTemplate>> {
        let prefix = template_prefix(&identity);
        self.scan(
            &prefix,
            IteratorMode::From(prefix.as_bytes(), Direction::Forward),
            usize::MAX,
        )
    }

    async fn append_attempt(
        &self,
        identity: IdentityHandle,
        success: bool,
        match_percentage: Option<f64>,
    ) -> Result<()> {
        self.ensure_known(&identity)?;
        let attempt = AttemptRecord {
            identity,
            timestamp: Utc::now(),
            success,
            match_percentage,
        };
        self.put_sequenced(&attempt_prefix(&identity), &attempt)
    }

    async fn fetch_attempts(&self, identity: IdentityHandle, limit: usize) -> Result<Vec<AttemptRecord>> {
        let prefix = attempt_prefix(&identity);
        // '~' sorts after every digit, so this seeks to the newest attempt.
        let upper = format!("{}~", prefix);
        self.scan(
            &prefix,
            IteratorMode::From(upper.as_bytes(), Direction::Reverse),
            limit,
        )
    }

    async fn list_identities(&self) -> Result<Vec<(IdentityHandle, String)>> {
        let records: Vec<IdentityRecord> = self.scan(
            "user:",
            IteratorMode::From(b"user:", Direction::Forward),
            usize::MAX,
        )?;
        Ok(records
            .into_iter()
            .map(|record| (record.handle, record.username))
            .collect())
    }
}
