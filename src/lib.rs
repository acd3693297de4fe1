pub mod core;
pub mod storage;
pub mod utils;

use std::sync::Arc;
use tracing::info;

use crate::{
    core::{
        identity::{
            biometric::TemplateGenerator,
            types::{AttemptRecord, AuthResult, EnrollmentResult, EnrollmentStatus, IdentityHandle, LiveSample},
        },
        matching::matcher::Matcher,
        services::{authentication::AuthenticationService, enrollment::EnrollmentService},
    },
    storage::{IdentityStore, MemoryStore},
    utils::{
        config::{Config, StorageBackend},
        error::Result,
    },
};

/// Enrollment and authentication wired against one identity store.
pub struct BiometricSystem {
    config: Arc<Config>,
    enrollment_service: EnrollmentService,
    authentication_service: AuthenticationService,
}

impl BiometricSystem {
    /// Opens the store named by `config.storage`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = open_store(&config)?;
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn IdentityStore>) -> Result<Self> {
        Self::with_generator(config, store, Arc::new(TemplateGenerator::default()))
    }

    pub fn with_generator(
        config: Config,
        store: Arc<dyn IdentityStore>,
        generator: Arc<TemplateGenerator>,
    ) -> Result<Self> {
        config.validate()?;
        let matcher = Matcher::new(config.matcher.threshold)?;

        info!(
            threshold = matcher.threshold(),
            verify_integrity = config.matcher.verify_integrity,
            "Initializing biometric services"
        );

        let enrollment_service = EnrollmentService::new(store.clone(), generator.clone());
        let authentication_service =
            AuthenticationService::new(store, generator, matcher, config.matcher.verify_integrity);

        Ok(Self {
            config: Arc::new(config),
            enrollment_service,
            authentication_service,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn enroll(&self, username: &str, email: &str, samples: Option<usize>) -> Result<EnrollmentResult> {
        let samples = samples.unwrap_or(self.config.enrollment.default_samples);
        self.enrollment_service.enroll(username, email, samples).await
    }

    pub async fn enrollment_status(&self, username: &str) -> Result<EnrollmentStatus> {
        self.enrollment_service.status(username).await
    }

    pub async fn authenticate(&self, username: &str, live_sample: Option<LiveSample>) -> Result<AuthResult> {
        self.authentication_service.authenticate(username, live_sample).await
    }

    pub async fn history(&self, username: &str, limit: Option<usize>) -> Result<Vec<AttemptRecord>> {
        let limit = limit.unwrap_or(self.config.history.default_limit);
        self.authentication_service.history(username, limit).await
    }

    pub async fn identities(&self) -> Result<Vec<(IdentityHandle, String)>> {
        self.enrollment_service.list_identities().await
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn IdentityStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory identity store");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "rocksdb")]
        StorageBackend::Rocksdb => {
            let path = config.storage.path.as_deref().unwrap_or_default();
            info!("Opening RocksDB identity store at {}", path);
            Ok(Arc::new(storage::RocksStore::open(path)?))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::Rocksdb => Err(utils::error::BiometricError::Config(
            "storage.backend = \"rocksdb\" requires the `rocksdb` feature".into(),
        )),
    }
}
