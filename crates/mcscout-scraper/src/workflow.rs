//! One lookup: snapshot query, extraction, enrichment, and validation.

use std::future::Future;
use std::time::Duration;

use mcscout_core::{AppConfig, CarrierRecord, EntityType};

use crate::client::PageFetcher;
use crate::enrich::EnrichmentNavigator;
use crate::error::ScraperError;
use crate::extract::{extract_primary, NotFoundReason};
use crate::validate::{is_acceptable, RejectReason};

/// Result of looking up a single MC number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(Box<CarrierRecord>),
    NotFound(NotFoundReason),
    Rejected(RejectReason),
    /// The snapshot request itself failed; the message is for display only.
    TransportFailure(String),
}

/// Anything that can resolve an MC number to a [`LookupOutcome`].
///
/// The acquisition loop is written against this so it can be driven without
/// a network.
pub trait CarrierLookup {
    fn lookup(
        &self,
        identifier: u64,
        entity_type: EntityType,
    ) -> impl Future<Output = LookupOutcome> + Send;
}

/// Remote endpoints a [`CarrierScraper`] talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub snapshot_url: String,
    pub snapshot_origin: String,
    pub sms_origin: String,
}

impl Endpoints {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            snapshot_url: config.snapshot_url.clone(),
            snapshot_origin: config.snapshot_origin.clone(),
            sms_origin: config.sms_origin.clone(),
        }
    }
}

/// Looks carriers up against the snapshot service and follows their SMS
/// links for contact details.
pub struct CarrierScraper {
    fetcher: PageFetcher,
    endpoints: Endpoints,
    politeness: Duration,
}

impl CarrierScraper {
    #[must_use]
    pub fn new(fetcher: PageFetcher, endpoints: Endpoints, politeness: Duration) -> Self {
        Self {
            fetcher,
            endpoints,
            politeness,
        }
    }

    /// Builds a scraper with a fresh cookie jar from process config.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let fetcher = PageFetcher::new(config.request_timeout_secs, &config.user_agent)?;
        Ok(Self::new(
            fetcher,
            Endpoints::from_config(config),
            Duration::from_millis(config.politeness_delay_ms),
        ))
    }

    /// Runs the full workflow for `identifier`.
    ///
    /// Only a failed snapshot request is reported as a transport failure;
    /// enrichment problems leave the primary record as it was.
    pub async fn lookup_carrier(&self, identifier: u64, entity_type: EntityType) -> LookupOutcome {
        let form = [
            ("searchtype", "ANY".to_owned()),
            ("query_type", "queryCarrierSnapshot".to_owned()),
            ("query_param", "MC_MX".to_owned()),
            ("query_string", identifier.to_string()),
        ];
        let referer = format!("{}/CompanySnapshot.aspx", self.endpoints.snapshot_origin);
        let page = match self
            .fetcher
            .post_form(
                &self.endpoints.snapshot_url,
                &form,
                &self.endpoints.snapshot_origin,
                &referer,
            )
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(identifier, error = %e, "snapshot request failed");
                return LookupOutcome::TransportFailure(e.to_string());
            }
        };

        let mut record = match extract_primary(&page.body, identifier, &self.endpoints.sms_origin) {
            Ok(record) => record,
            Err(reason) => {
                tracing::debug!(identifier, %reason, "no record");
                return LookupOutcome::NotFound(reason);
            }
        };

        let referer = format!("{}/", self.endpoints.snapshot_origin);
        EnrichmentNavigator::new(&self.fetcher, referer, self.politeness)
            .enrich(&mut record)
            .await;

        match is_acceptable(&record, entity_type) {
            Ok(()) => LookupOutcome::Found(Box::new(record)),
            Err(reason) => {
                tracing::debug!(identifier, %reason, "record filtered out");
                LookupOutcome::Rejected(reason)
            }
        }
    }
}

impl CarrierLookup for CarrierScraper {
    fn lookup(
        &self,
        identifier: u64,
        entity_type: EntityType,
    ) -> impl Future<Output = LookupOutcome> + Send {
        self.lookup_carrier(identifier, entity_type)
    }
}
