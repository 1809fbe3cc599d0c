//! Business logic services

pub mod assets;
pub mod availability;
pub mod qr;
pub mod rate_limit;
pub mod storage;

use std::sync::Arc;

use crate::{
    config::{QrConfig, RateLimitConfig, StorageConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub assets: assets::AssetsService,
    pub availability: availability::AvailabilityService,
    pub qr: qr::QrService,
    pub rate_limit: rate_limit::RateLimitService,
}

impl Services {
    /// Create all services with the given repository and object store
    pub fn new(
        repository: Repository,
        object_store: Arc<dyn storage::ObjectStore>,
        storage_config: &StorageConfig,
        qr_config: QrConfig,
        rate_limit_config: RateLimitConfig,
    ) -> Self {
        Self {
            assets: assets::AssetsService::new(repository.clone()),
            availability: availability::AvailabilityService::new(repository.clone()),
            qr: qr::QrService::new(
                Arc::new(repository.assets.clone()),
                object_store,
                qr_config,
                storage_config.key_prefix.clone(),
            ),
            rate_limit: rate_limit::RateLimitService::new(
                Arc::new(repository.rate_limits.clone()),
                rate_limit_config,
            ),
        }
    }
}
