//! Asset catalog service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{AssetQuery, CreateAsset, UpdateAsset},
        Asset,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
}

impl AssetsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search one company's assets with pagination, newest first
    pub async fn search(
        &self,
        company_id: Uuid,
        query: &AssetQuery,
    ) -> AppResult<(Vec<Asset>, i64)> {
        self.repository.assets.search(company_id, query).await
    }

    pub async fn get(&self, id: Uuid, company_scope: Option<Uuid>) -> AppResult<Asset> {
        let asset = self.repository.assets.get_by_id(id).await?;
        if let Some(company_id) = company_scope {
            if asset.company_id != company_id {
                return Err(AppError::Authorization(
                    "Asset does not belong to company".to_string(),
                ));
            }
        }
        Ok(asset)
    }

    pub async fn create(&self, company_id: Uuid, data: &CreateAsset) -> AppResult<Asset> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.assets.create(company_id, data).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        company_scope: Option<Uuid>,
        data: &UpdateAsset,
    ) -> AppResult<Asset> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let existing = self.repository.assets.get_by_id(id).await?;
        if let Some(company_id) = company_scope {
            if existing.company_id != company_id {
                return Err(AppError::Authorization(
                    "Asset does not belong to company".to_string(),
                ));
            }
        }
        self.repository.assets.update(id, data).await
    }

    pub async fn delete(&self, id: Uuid, company_scope: Option<Uuid>) -> AppResult<()> {
        let existing = self.repository.assets.get_by_id(id).await?;
        if let Some(company_id) = company_scope {
            if existing.company_id != company_id {
                return Err(AppError::Authorization(
                    "Asset does not belong to company".to_string(),
                ));
            }
        }
        self.repository.assets.delete(id).await
    }
}
