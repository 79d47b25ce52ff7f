//! # Diagnostics
//!
//! Connectivity probes behind the settings debug panel. Each probe reports
//! what it saw; none of them returns an error.

use super::StyleSync;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use ss_core::models::{Event, Item, Outfit};
use ss_core::query::{Query, Table};
use tracing::{info, warn};

const PROBE_ROWS: usize = 5;
const PROBE_CONTENT: &[u8] = b"test file content";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub sample: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketAccess {
    pub bucket: String,
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadProbe {
    pub uploaded: bool,
    pub cleaned_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub buckets: Vec<String>,
    pub missing_buckets: Vec<String>,
    pub has_required_buckets: bool,
    pub access: Vec<BucketAccess>,
    /// Present only when the items bucket exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadProbe>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probe {
    pub target: String,
    pub ok: bool,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseReport {
    pub probes: Vec<Probe>,
}

impl DatabaseReport {
    pub fn all_ok(&self) -> bool {
        self.probes.iter().all(|p| p.ok)
    }
}

/// Records dropped from the local fallback store, per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocalClearReport {
    pub items: usize,
    pub outfits: usize,
    pub events: usize,
}

pub struct DiagnosticsApi<'a> {
    pub(super) app: &'a StyleSync,
}

impl DiagnosticsApi<'_> {
    /// Reads one category row.
    pub async fn test_connection(&self) -> ConnectionReport {
        match self.app.ports.rows.select(&Query::from(Table::Categories).limit(1)).await {
            Ok(sample) => {
                info!("Backend connection ok");
                ConnectionReport { success: true, error: None, sample }
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Backend connection failed");
                ConnectionReport { success: false, error: Some(format!("{e:#}")), sample: Vec::new() }
            }
        }
    }

    /// Lists buckets, checks the required ones, tries to read each bucket,
    /// and round-trips a small file through the items bucket.
    pub async fn test_storage(&self) -> StorageReport {
        let objects = &self.app.ports.objects;
        let buckets = match objects.list_buckets().await {
            Ok(buckets) => buckets,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Listing storage buckets failed");
                return StorageReport { error: Some(format!("{e:#}")), ..Default::default() };
            }
        };

        let options = &self.app.options;
        let missing_buckets: Vec<String> = [&options.avatars_bucket, &options.items_bucket]
            .into_iter()
            .filter(|required| !buckets.contains(*required))
            .cloned()
            .collect();

        let mut access = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            let result = objects.list_objects(bucket, "", 1).await;
            access.push(BucketAccess {
                bucket: bucket.clone(),
                accessible: result.is_ok(),
                error: result.err().map(|e| format!("{e:#}")),
            });
        }

        let upload = if buckets.contains(&options.items_bucket) {
            Some(self.probe_upload(&options.items_bucket).await)
        } else {
            None
        };

        StorageReport {
            success: true,
            error: None,
            has_required_buckets: missing_buckets.is_empty(),
            missing_buckets,
            buckets,
            access,
            upload,
        }
    }

    async fn probe_upload(&self, bucket: &str) -> UploadProbe {
        let objects = &self.app.ports.objects;
        let path = format!("test-{}.txt", Utc::now().timestamp_millis());
        let stored = match objects.upload(bucket, &path, Bytes::from_static(PROBE_CONTENT), "text/plain").await {
            Ok(stored) => stored,
            Err(e) => {
                return UploadProbe { uploaded: false, cleaned_up: false, error: Some(format!("{e:#}")) };
            }
        };
        match objects.remove(bucket, &[stored]).await {
            Ok(()) => UploadProbe { uploaded: true, cleaned_up: true, error: None },
            Err(e) => {
                warn!(bucket, error = %format!("{e:#}"), "Failed to clean up storage probe");
                UploadProbe { uploaded: true, cleaned_up: false, error: Some(format!("{e:#}")) }
            }
        }
    }

    /// Forgets `owner`'s offline records. Collections left empty are
    /// cleared from the local store.
    pub async fn clear_local_records(&self, owner: &str) -> LocalClearReport {
        let cache = &self.app.cache;
        let (items, outfits, events) = tokio::join!(
            cache.remove_owned_by::<Item>(owner),
            cache.remove_owned_by::<Outfit>(owner),
            cache.remove_owned_by::<Event>(owner),
        );
        info!(owner, items, outfits, events, "Cleared local records");
        LocalClearReport { items, outfits, events }
    }

    /// Samples the main tables and the bucket list.
    pub async fn debug_database(&self) -> DatabaseReport {
        let mut probes = Vec::new();
        for table in [Table::Categories, Table::Items, Table::Users] {
            let probe = match self.app.ports.rows.select(&Query::from(table).limit(PROBE_ROWS)).await {
                Ok(rows) => Probe { target: table.to_string(), ok: true, rows: rows.len(), error: None },
                Err(e) => Probe { target: table.to_string(), ok: false, rows: 0, error: Some(format!("{e:#}")) },
            };
            probes.push(probe);
        }
        probes.push(match self.app.ports.objects.list_buckets().await {
            Ok(buckets) => Probe { target: "storage".into(), ok: true, rows: buckets.len(), error: None },
            Err(e) => Probe { target: "storage".into(), ok: false, rows: 0, error: Some(format!("{e:#}")) },
        });
        DatabaseReport { probes }
    }
}
