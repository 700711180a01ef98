//! Two-hop enrichment: SMS results page, then the carrier registration page.

use std::time::Duration;

use mcscout_core::CarrierRecord;

use crate::client::{resolve_link, Page, PageFetcher};
use crate::extract::{extract_enrichment, find_registration_link};

/// Where enrichment of one record currently stands.
///
/// Any step that cannot proceed jumps straight to [`EnrichmentState::Enriched`],
/// leaving the record as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentState {
    /// The snapshot record is in hand, possibly with an SMS results link.
    HasPrimary { results_url: Option<String> },
    /// The SMS results page was fetched and carries a registration link.
    HasSecondaryLink { page_url: String, href: String },
    /// The registration page body, ready to be mined.
    HasDetailsLink { body: String },
    Enriched,
}

/// Follows the SMS links of a snapshot record to fill its contact fields.
pub struct EnrichmentNavigator<'a> {
    fetcher: &'a PageFetcher,
    referer: String,
    politeness: Duration,
}

impl<'a> EnrichmentNavigator<'a> {
    /// `referer` is sent on both hops; `politeness` is slept before each.
    #[must_use]
    pub fn new(fetcher: &'a PageFetcher, referer: impl Into<String>, politeness: Duration) -> Self {
        Self {
            fetcher,
            referer: referer.into(),
            politeness,
        }
    }

    /// Runs the state machine to completion. Never fails: a missing link or a
    /// failed fetch ends enrichment with whatever the record already holds.
    pub async fn enrich(&self, record: &mut CarrierRecord) {
        let mut state = EnrichmentState::HasPrimary {
            results_url: record.enrichment_url.clone(),
        };
        while state != EnrichmentState::Enriched {
            state = self.step(state, record).await;
        }
    }

    /// Advances one transition.
    pub async fn step(&self, state: EnrichmentState, record: &mut CarrierRecord) -> EnrichmentState {
        let identifier = record.identifier;
        match state {
            EnrichmentState::HasPrimary { results_url: None } | EnrichmentState::Enriched => {
                EnrichmentState::Enriched
            }
            EnrichmentState::HasPrimary {
                results_url: Some(url),
            } => {
                let Some(page) = self.fetch(identifier, &url).await else {
                    return EnrichmentState::Enriched;
                };
                match find_registration_link(&page.body) {
                    Some(href) => EnrichmentState::HasSecondaryLink {
                        page_url: page.url,
                        href,
                    },
                    None => {
                        tracing::debug!(identifier, url, "no registration link on results page");
                        EnrichmentState::Enriched
                    }
                }
            }
            EnrichmentState::HasSecondaryLink { page_url, href } => {
                let Some(url) = resolve_link(&page_url, &href) else {
                    return EnrichmentState::Enriched;
                };
                match self.fetch(identifier, &url).await {
                    Some(page) => EnrichmentState::HasDetailsLink { body: page.body },
                    None => EnrichmentState::Enriched,
                }
            }
            EnrichmentState::HasDetailsLink { body } => {
                extract_enrichment(&body, record);
                EnrichmentState::Enriched
            }
        }
    }

    async fn fetch(&self, identifier: u64, url: &str) -> Option<Page> {
        tokio::time::sleep(self.politeness).await;
        match self.fetcher.get(url, &self.referer).await {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!(identifier, url, error = %e, "enrichment fetch failed");
                None
            }
        }
    }
}
