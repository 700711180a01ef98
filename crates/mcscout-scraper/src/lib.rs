pub mod acquisition;
pub mod client;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod session;
pub mod validate;
pub mod workflow;

pub use acquisition::{
    run_acquisition, CompletionCallback, CompletionReason, Pacer, ProgressEvent, ProgressStatus,
    StopSignal, Summary,
};
pub use client::{Page, PageFetcher};
pub use enrich::{EnrichmentNavigator, EnrichmentState};
pub use error::{ScraperError, SessionError};
pub use extract::{extract_enrichment, extract_primary, find_registration_link, NotFoundReason};
pub use session::{SessionManager, SessionStatus};
pub use validate::{is_acceptable, RejectReason};
pub use workflow::{CarrierLookup, CarrierScraper, Endpoints, LookupOutcome};
