//! Subscribed licenses and SKU display names

use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::api::client::GraphClient;
use crate::api::constants::paths;
use crate::api::error::GraphResult;
use crate::api::models::{SkuRecord, SubscribedSku};

/// Maps SKU part numbers (e.g. `ENTERPRISEPACK`) to friendly names
#[derive(Debug, Clone, Default)]
pub struct SkuCatalog {
    names: HashMap<String, String>,
}

impl SkuCatalog {
    pub fn from_map(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    /// Load a JSON object of part number -> name. A missing or malformed
    /// file yields an empty catalog.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read SKU catalog {:?}: {}", path, e);
                return Self::default();
            }
        };

        match serde_json::from_str::<HashMap<String, String>>(&content) {
            Ok(names) => {
                debug!("Loaded {} SKU names from {:?}", names.len(), path);
                Self { names }
            }
            Err(e) => {
                warn!("Failed to parse SKU catalog {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Friendly name, falling back to the part number itself
    pub fn display_name(&self, sku_part_number: &str) -> String {
        self.names
            .get(sku_part_number)
            .cloned()
            .unwrap_or_else(|| sku_part_number.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl GraphClient {
    pub async fn subscribed_skus(&self) -> GraphResult<Vec<SubscribedSku>> {
        self.get(paths::SUBSCRIBED_SKUS, &[]).await?.into_list()
    }

    /// Subscribed SKUs as license summary rows
    pub async fn license_summary(&self, catalog: &SkuCatalog) -> GraphResult<Vec<SkuRecord>> {
        let skus = self.subscribed_skus().await?;
        debug!("Received {} SKUs from Graph", skus.len());

        Ok(skus.into_iter().map(|sku| to_record(sku, catalog)).collect())
    }
}

fn to_record(sku: SubscribedSku, catalog: &SkuCatalog) -> SkuRecord {
    SkuRecord {
        display_name: catalog.display_name(&sku.sku_part_number),
        sku_id: sku.sku_id,
        sku_part_number: sku.sku_part_number,
        consumed_units: sku.consumed_units,
        enabled_units: sku.prepaid_units.enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_falls_back_to_part_number() {
        let catalog = SkuCatalog::from_map(HashMap::from([(
            "ENTERPRISEPACK".to_string(),
            "Office 365 E3".to_string(),
        )]));

        assert_eq!(catalog.display_name("ENTERPRISEPACK"), "Office 365 E3");
        assert_eq!(catalog.display_name("EMS"), "EMS");
    }

    #[test]
    fn test_missing_catalog_is_empty() {
        let catalog = SkuCatalog::load(Path::new("/nonexistent/sku_map.json"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_record_derives_available_units() {
        let sku: SubscribedSku = serde_json::from_value(json!({
            "skuId": "6fd2c87f",
            "skuPartNumber": "ENTERPRISEPACK",
            "consumedUnits": 12,
            "prepaidUnits": {"enabled": 10, "suspended": 0, "warning": 0}
        }))
        .unwrap();

        let record = to_record(sku, &SkuCatalog::default());
        assert_eq!(record.enabled_units, 10);
        assert_eq!(record.consumed_units, 12);
        assert_eq!(record.available_units(), -2);
    }
}
