//! The fetch and enrichment pipeline
//!
//! One run fetches the shrine from the first healthy source, fetches the
//! catalog, merges the two and produces a fresh [`Snapshot`]. A catalog
//! failure only degrades the result; a shrine failure fails the run.
//!
//! The pipeline has two callers: the cache controller (recurring, in memory)
//! and the `fetch` subcommand (one shot, written to the snapshot file).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::data::{shrine_perks, CatalogClient, Enricher, FetchError, Fetched, Record, Snapshot, SourceFetcher};

/// Anything that can produce a new snapshot on demand
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError>;
}

/// Source fetch, catalog fetch and enrichment wired together
#[derive(Debug, Clone)]
pub struct ShrinePipeline {
    fetcher: SourceFetcher,
    catalog: CatalogClient,
    shrine_sources: Vec<String>,
    enricher: Enricher,
}

impl ShrinePipeline {
    pub fn new(config: &Config, http_client: Client) -> Self {
        let fetcher = SourceFetcher::new(http_client);
        Self {
            catalog: CatalogClient::new(fetcher.clone(), config.catalog_sources.clone()),
            fetcher,
            shrine_sources: config.shrine_sources.clone(),
            enricher: Enricher::default(),
        }
    }

    /// Replaces the enricher (image base host and override table)
    pub fn with_enricher(mut self, enricher: Enricher) -> Self {
        self.enricher = enricher;
        self
    }

    /// Runs the full pipeline once
    pub async fn run(&self) -> Result<Snapshot, FetchError> {
        let fetched = self.fetcher.fetch_first(&self.shrine_sources).await?;

        let catalog = match self.catalog.fetch_entries().await {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(error = %e, "catalog unavailable, serving shrine without perk metadata");
                None
            }
        };

        let snapshot = assemble_snapshot(fetched, catalog.as_deref(), &self.enricher);
        info!(
            source = %snapshot.source_used,
            perks = snapshot.perks_with_images.len(),
            enriched = catalog.is_some(),
            "shrine fetched"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotSource for ShrinePipeline {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        self.run().await
    }
}

/// Builds a snapshot from a fetched shrine and an optional catalog
///
/// Without a catalog, perks only get image normalization and name overrides.
pub fn assemble_snapshot(fetched: Fetched, catalog: Option<&[Record]>, enricher: &Enricher) -> Snapshot {
    let perks = shrine_perks(&fetched.payload);
    let perks_with_images = match catalog {
        Some(entries) => enricher.merge(perks, entries),
        None => enricher.images_only(perks),
    };
    let images = enricher.image_records(&perks_with_images);

    Snapshot {
        fetched_at: Utc::now(),
        source_used: fetched.url,
        source_tried: fetched.tried,
        data: fetched.payload,
        perks_with_images,
        images,
    }
}
