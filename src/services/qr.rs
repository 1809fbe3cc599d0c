//! QR code batch generation service
//!
//! Each asset gets one QR image at the deterministic object key
//! `{prefix}/{asset_id}.png`, pointing at the most specific target URL we
//! can derive for it. Batch runs are sequential and per-item isolated: a
//! failing asset is recorded in the summary and the run continues.
//! Re-running without `force` only touches assets still missing a code;
//! `force` regenerates everything in scope over the same object keys.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{ImageFormat, Luma};
#[cfg(test)]
use mockall::automock;
use qrcode::QrCode;
use uuid::Uuid;

use crate::{
    api::qr::QrBatchResult,
    config::QrConfig,
    error::{AppError, AppResult},
    models::Asset,
    repository::assets::AssetsRepository,
    services::storage::ObjectStore,
};

/// Asset lookup and write-back seam for QR generation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QrInventory: Send + Sync {
    async fn qr_eligible_assets(
        &self,
        company_id: Option<Uuid>,
        force: bool,
    ) -> AppResult<Vec<Asset>>;
    async fn asset_by_id(&self, id: Uuid) -> AppResult<Asset>;
    async fn store_qr_url(&self, id: Uuid, url: &str) -> AppResult<()>;
}

#[async_trait]
impl QrInventory for AssetsRepository {
    async fn qr_eligible_assets(
        &self,
        company_id: Option<Uuid>,
        force: bool,
    ) -> AppResult<Vec<Asset>> {
        self.list_qr_eligible(company_id, force).await
    }

    async fn asset_by_id(&self, id: Uuid) -> AppResult<Asset> {
        self.get_by_id(id).await
    }

    async fn store_qr_url(&self, id: Uuid, url: &str) -> AppResult<()> {
        self.set_qr_code_url(id, url).await
    }
}

/// Pick the URL a scanned code should open. Most specific first: the
/// curated street-view link, then the curated location link, then a map
/// link synthesized from coordinates, then the asset detail page.
pub fn target_url(asset: &Asset, site_url: &str) -> Option<String> {
    if let Some(url) = asset.street_view_url.as_deref() {
        if !url.is_empty() {
            return Some(url.to_string());
        }
    }
    if let Some(url) = asset.location_url.as_deref() {
        if !url.is_empty() {
            return Some(url.to_string());
        }
    }
    if let (Some(lat), Some(lng)) = (asset.latitude, asset.longitude) {
        return Some(format!("https://www.google.com/maps?q={},{}", lat, lng));
    }
    if !site_url.is_empty() {
        return Some(format!(
            "{}/assets/{}",
            site_url.trim_end_matches('/'),
            asset.id
        ));
    }
    None
}

/// Render `contents` as a PNG QR image at least `min_size` pixels square
pub fn render_png(contents: &str, min_size: u32) -> AppResult<Vec<u8>> {
    let code = QrCode::new(contents.as_bytes())
        .map_err(|e| AppError::QrEncoding(format!("encode {}: {}", contents, e)))?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(min_size, min_size)
        .build();

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AppError::QrEncoding(format!("render PNG: {}", e)))?;
    Ok(bytes)
}

#[derive(Clone)]
pub struct QrService {
    inventory: Arc<dyn QrInventory>,
    storage: Arc<dyn ObjectStore>,
    config: QrConfig,
    key_prefix: String,
}

impl QrService {
    pub fn new(
        inventory: Arc<dyn QrInventory>,
        storage: Arc<dyn ObjectStore>,
        config: QrConfig,
        key_prefix: String,
    ) -> Self {
        Self {
            inventory,
            storage,
            config,
            key_prefix,
        }
    }

    /// Generate QR codes for every eligible asset in scope. One asset
    /// failing never aborts the batch; its error lands in the summary.
    pub async fn generate_batch(
        &self,
        company_id: Option<Uuid>,
        force: bool,
    ) -> AppResult<QrBatchResult> {
        let assets = self.inventory.qr_eligible_assets(company_id, force).await?;
        let total = assets.len() as i64;
        let mut succeeded: i64 = 0;
        let mut errors = Vec::new();

        for asset in &assets {
            match self.generate_one(asset).await {
                Ok(url) => {
                    tracing::debug!(asset_id = %asset.id, url = %url, "QR code generated");
                    succeeded += 1;
                }
                Err(e) => {
                    tracing::warn!(asset_id = %asset.id, error = %e, "QR code generation failed");
                    errors.push(format!("{}: {}", asset.id, e));
                }
            }
        }

        let failed = errors.len() as i64;
        Ok(QrBatchResult {
            success: failed == 0,
            total,
            succeeded,
            failed,
            errors,
        })
    }

    /// Generate (or with `force`, regenerate) the QR code of a single asset
    pub async fn generate_for_asset(
        &self,
        asset_id: Uuid,
        company_scope: Option<Uuid>,
        force: bool,
    ) -> AppResult<String> {
        let asset = self.inventory.asset_by_id(asset_id).await?;
        if let Some(company_id) = company_scope {
            if asset.company_id != company_id {
                return Err(AppError::Authorization(
                    "Asset does not belong to company".to_string(),
                ));
            }
        }
        if !force && asset.qr_code_url.as_deref().map_or(false, |u| !u.is_empty()) {
            return Err(AppError::Conflict(
                "Asset already has a QR code, pass force to regenerate".to_string(),
            ));
        }
        self.generate_one(&asset).await
    }

    async fn generate_one(&self, asset: &Asset) -> AppResult<String> {
        let target = target_url(asset, &self.config.site_url)
            .ok_or_else(|| AppError::Validation("no target URL available".to_string()))?;
        let png = render_png(&target, self.config.image_size)?;

        let key = format!("{}/{}.png", self.key_prefix, asset.id);
        self.storage.put(&key, png, "image/png").await?;

        let url = self.storage.public_url(&key);
        self.inventory.store_qr_url(asset.id, &url).await?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetKind;
    use crate::services::storage::MockObjectStore;
    use chrono::Utc;

    fn test_asset() -> Asset {
        Asset {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            code: "PAN-001".to_string(),
            name: "Gare du Nord east face".to_string(),
            kind: AssetKind::Billboard,
            address: None,
            city: None,
            latitude: None,
            longitude: None,
            street_view_url: None,
            location_url: None,
            qr_code_url: None,
            qr_generated_at: None,
            monthly_rate: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn test_config() -> QrConfig {
        QrConfig {
            image_size: 256,
            site_url: "https://app.test".to_string(),
        }
    }

    fn service(inventory: MockQrInventory, storage: MockObjectStore) -> QrService {
        QrService::new(
            Arc::new(inventory),
            Arc::new(storage),
            test_config(),
            "qr-codes".to_string(),
        )
    }

    #[test]
    fn test_target_url_prefers_street_view() {
        let mut asset = test_asset();
        asset.street_view_url = Some("https://maps.example/street".to_string());
        asset.location_url = Some("https://maps.example/location".to_string());
        asset.latitude = Some(48.8566);
        asset.longitude = Some(2.3522);

        assert_eq!(
            target_url(&asset, "https://app.test"),
            Some("https://maps.example/street".to_string())
        );
    }

    #[test]
    fn test_target_url_falls_back_to_location() {
        let mut asset = test_asset();
        asset.street_view_url = Some(String::new());
        asset.location_url = Some("https://maps.example/location".to_string());
        asset.latitude = Some(48.8566);
        asset.longitude = Some(2.3522);

        assert_eq!(
            target_url(&asset, "https://app.test"),
            Some("https://maps.example/location".to_string())
        );
    }

    #[test]
    fn test_target_url_synthesizes_map_link_from_coordinates() {
        let mut asset = test_asset();
        asset.latitude = Some(48.8566);
        asset.longitude = Some(2.3522);

        assert_eq!(
            target_url(&asset, "https://app.test"),
            Some("https://www.google.com/maps?q=48.8566,2.3522".to_string())
        );
    }

    #[test]
    fn test_target_url_requires_both_coordinates() {
        let mut asset = test_asset();
        asset.latitude = Some(48.8566);

        let url = target_url(&asset, "https://app.test").unwrap();
        assert_eq!(url, format!("https://app.test/assets/{}", asset.id));
    }

    #[test]
    fn test_target_url_detail_page_strips_trailing_slash() {
        let asset = test_asset();

        let url = target_url(&asset, "https://app.test/").unwrap();
        assert_eq!(url, format!("https://app.test/assets/{}", asset.id));
    }

    #[test]
    fn test_target_url_none_without_any_candidate() {
        let asset = test_asset();
        assert_eq!(target_url(&asset, ""), None);
    }

    #[test]
    fn test_render_png_produces_png_bytes() {
        let bytes = render_png("https://app.test/assets/1", 64).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_batch_with_no_eligible_assets_is_trivial_success() {
        let mut inventory = MockQrInventory::new();
        inventory
            .expect_qr_eligible_assets()
            .returning(|_, _| Ok(Vec::new()));
        let storage = MockObjectStore::new();

        let result = service(inventory, storage)
            .generate_batch(None, false)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.total, 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, 0);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_batch_isolates_failing_asset() {
        let first = test_asset();
        let second = test_asset();
        let third = test_asset();
        let assets = vec![first.clone(), second.clone(), third.clone()];
        let bad_key = format!("qr-codes/{}.png", second.id);

        let mut inventory = MockQrInventory::new();
        inventory
            .expect_qr_eligible_assets()
            .returning(move |_, _| Ok(assets.clone()));
        let first_id = first.id;
        inventory
            .expect_store_qr_url()
            .withf(move |id, _| *id == first_id)
            .times(1)
            .returning(|_, _| Ok(()));
        let third_id = third.id;
        inventory
            .expect_store_qr_url()
            .withf(move |id, _| *id == third_id)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut storage = MockObjectStore::new();
        storage.expect_put().returning(move |key, _, _| {
            if key == bad_key {
                Err(AppError::Storage("bucket unreachable".to_string()))
            } else {
                Ok(())
            }
        });
        storage
            .expect_public_url()
            .returning(|key| format!("https://cdn.test/{}", key));

        let result = service(inventory, storage)
            .generate_batch(None, false)
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.total, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with(&second.id.to_string()));
    }

    #[tokio::test]
    async fn test_batch_records_assets_without_target_url() {
        let asset = test_asset();
        let assets = vec![asset.clone()];

        let mut inventory = MockQrInventory::new();
        inventory
            .expect_qr_eligible_assets()
            .returning(move |_, _| Ok(assets.clone()));
        let mut storage = MockObjectStore::new();
        storage.expect_put().times(0);

        let service = QrService::new(
            Arc::new(inventory),
            Arc::new(storage),
            QrConfig {
                image_size: 256,
                site_url: String::new(),
            },
            "qr-codes".to_string(),
        );
        let result = service.generate_batch(None, false).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.total, 1);
        assert_eq!(result.failed, 1);
        assert!(result.errors[0].contains("no target URL"));
    }

    #[tokio::test]
    async fn test_single_asset_writes_back_public_url() {
        let asset = test_asset();
        let asset_id = asset.id;
        let expected_key = format!("qr-codes/{}.png", asset_id);
        let expected_url = format!("https://cdn.test/{}", expected_key);

        let mut inventory = MockQrInventory::new();
        let lookup = asset.clone();
        inventory
            .expect_asset_by_id()
            .returning(move |_| Ok(lookup.clone()));
        let url_check = expected_url.clone();
        inventory
            .expect_store_qr_url()
            .withf(move |id, url| *id == asset_id && url == url_check)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut storage = MockObjectStore::new();
        let key_check = expected_key.clone();
        storage
            .expect_put()
            .withf(move |key, bytes, content_type| {
                key == key_check && !bytes.is_empty() && content_type == "image/png"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        storage
            .expect_public_url()
            .returning(|key| format!("https://cdn.test/{}", key));

        let url = service(inventory, storage)
            .generate_for_asset(asset_id, Some(asset.company_id), false)
            .await
            .unwrap();

        assert_eq!(url, expected_url);
    }

    #[tokio::test]
    async fn test_single_asset_conflicts_when_url_exists_without_force() {
        let mut asset = test_asset();
        asset.qr_code_url = Some("https://cdn.test/qr-codes/old.png".to_string());

        let mut inventory = MockQrInventory::new();
        let lookup = asset.clone();
        inventory
            .expect_asset_by_id()
            .returning(move |_| Ok(lookup.clone()));
        inventory.expect_store_qr_url().times(0);
        let mut storage = MockObjectStore::new();
        storage.expect_put().times(0);

        let result = service(inventory, storage)
            .generate_for_asset(asset.id, None, false)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_single_asset_force_regenerates_existing_url() {
        let mut asset = test_asset();
        asset.street_view_url = Some("https://maps.example/street".to_string());
        asset.qr_code_url = Some("https://cdn.test/qr-codes/old.png".to_string());

        let mut inventory = MockQrInventory::new();
        let lookup = asset.clone();
        inventory
            .expect_asset_by_id()
            .returning(move |_| Ok(lookup.clone()));
        inventory
            .expect_store_qr_url()
            .times(1)
            .returning(|_, _| Ok(()));
        let mut storage = MockObjectStore::new();
        storage.expect_put().times(1).returning(|_, _, _| Ok(()));
        storage
            .expect_public_url()
            .returning(|key| format!("https://cdn.test/{}", key));

        let url = service(inventory, storage)
            .generate_for_asset(asset.id, None, true)
            .await
            .unwrap();

        assert!(url.ends_with(&format!("{}.png", asset.id)));
    }

    #[tokio::test]
    async fn test_single_asset_rejects_foreign_company_scope() {
        let asset = test_asset();

        let mut inventory = MockQrInventory::new();
        let lookup = asset.clone();
        inventory
            .expect_asset_by_id()
            .returning(move |_| Ok(lookup.clone()));
        let mut storage = MockObjectStore::new();
        storage.expect_put().times(0);

        let result = service(inventory, storage)
            .generate_for_asset(asset.id, Some(Uuid::new_v4()), false)
            .await;

        assert!(matches!(result, Err(AppError::Authorization(_))));
    }
}
