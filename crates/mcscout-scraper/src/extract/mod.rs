//! Field extraction for the carrier snapshot and registration pages.
//!
//! Everything here is synchronous and a pure function of the page body, so
//! running it twice on the same content yields the same record. Parsed
//! documents are not `Send`; callers must drop them before awaiting.

mod rows;
mod text;

use std::sync::LazyLock;

use mcscout_core::CarrierRecord;
use regex::Regex;
use scraper::{Html, Selector};

use crate::client::join_origin;

pub use text::{clean_phone, clean_text};

static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));
static DOCKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"n_docketno=(\d+)").expect("valid docket regex"));
static DOT_NO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"n_dotno=(\d+)").expect("valid dot regex"));
static SMS_RESULTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sms.*safer_xfr.*DOT=(\d+)").expect("valid sms regex"));
static REGISTRATION_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)carrier.*registration.*details").expect("valid registration regex")
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

/// Phrases the snapshot service uses instead of a 404, checked against the
/// lowercased page text.
const NOT_FOUND_PHRASES: &[&str] = &[
    "record not found",
    "no records matching",
    "querybadcharacter",
    "record inactive",
    "is inactive in the safer database",
];

/// Prefixes under which the snapshot page prints the MC number.
const REFERENCE_PREFIXES: &[&str] = &["MC-", "MC ", "MC#", "MC/MX Number = "];

/// Domains of the lookup service itself; addresses there are help desks,
/// not the carrier.
const SERVICE_EMAIL_DOMAINS: &[&str] = &["fmcsa.dot.gov", "usdot.gov", "dot.gov"];

/// Why a snapshot lookup yielded no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The page carried one of the service's "no such record" phrases.
    ServiceReported(&'static str),
    /// The page parsed, but does not reference the requested MC number.
    IdentifierMismatch,
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundReason::ServiceReported(phrase) => write!(f, "service reported \"{phrase}\""),
            NotFoundReason::IdentifierMismatch => f.write_str("page does not match requested MC"),
        }
    }
}

/// A parsed carrier snapshot page.
pub struct SnapshotPage {
    document: Html,
    text: String,
}

impl SnapshotPage {
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let document = Html::parse_document(body);
        // Unseparated so a reference split across inline tags ("MC-" then
        // "<b>123456</b>") still reads as one token.
        let text = document.root_element().text().collect::<String>();
        Self { document, text }
    }

    /// The "no such record" phrase present on the page, if any.
    #[must_use]
    pub fn not_found_phrase(&self) -> Option<&'static str> {
        let lower = self.text.to_lowercase();
        NOT_FOUND_PHRASES
            .iter()
            .copied()
            .find(|phrase| lower.contains(phrase))
    }

    /// Whether the page actually describes `identifier`.
    ///
    /// The service answers unknown numbers with a nearby or default record
    /// rather than an error, so a clean parse alone proves nothing. The page
    /// text must print the number under a known prefix, or a docket link must
    /// carry exactly this number.
    #[must_use]
    pub fn matches_identifier(&self, identifier: u64) -> bool {
        let wanted = identifier.to_string();
        if REFERENCE_PREFIXES
            .iter()
            .any(|prefix| text::contains_reference(&self.text, prefix, &wanted))
        {
            return true;
        }
        self.hrefs()
            .filter_map(|href| DOCKET_RE.captures(href))
            .any(|caps| caps[1] == *wanted)
    }

    /// Runs the label rules over the page's table rows.
    ///
    /// Never fails: fields with no matching row stay empty.
    #[must_use]
    pub fn extract_fields(&self, identifier: u64) -> CarrierRecord {
        let mut record = CarrierRecord::new(identifier);
        for pair in rows::label_value_pairs(&self.document) {
            if let Some(field) = rows::match_label(&pair.label) {
                rows::assign(&mut record, field, &pair);
            }
        }
        clean_record(&mut record);
        record
    }

    /// First USDOT number encoded in a `n_dotno=` link.
    #[must_use]
    pub fn usdot_from_links(&self) -> Option<String> {
        self.hrefs()
            .find_map(|href| DOT_NO_RE.captures(href).map(|caps| caps[1].to_owned()))
    }

    /// The SMS results link, absolutized against `sms_origin`.
    #[must_use]
    pub fn sms_results_link(&self, sms_origin: &str) -> Option<String> {
        self.hrefs()
            .find(|href| SMS_RESULTS_RE.is_match(href))
            .map(|href| join_origin(sms_origin, href))
    }

    fn hrefs(&self) -> impl Iterator<Item = &str> {
        self.document
            .select(&LINK_SEL)
            .filter_map(|a| a.value().attr("href"))
    }
}

/// Extracts and match-validates the primary record for `identifier`.
///
/// Covers the whole snapshot-page half of a lookup: the "no such record"
/// short-circuit, the label rules, match validation, USDOT link fallback,
/// and discovery of the SMS results link used for enrichment.
///
/// # Errors
///
/// Returns the [`NotFoundReason`] when the page reports no record or does
/// not reference `identifier`.
pub fn extract_primary(
    body: &str,
    identifier: u64,
    sms_origin: &str,
) -> Result<CarrierRecord, NotFoundReason> {
    let page = SnapshotPage::parse(body);

    if let Some(phrase) = page.not_found_phrase() {
        return Err(NotFoundReason::ServiceReported(phrase));
    }

    if !page.matches_identifier(identifier) {
        return Err(NotFoundReason::IdentifierMismatch);
    }

    let mut record = page.extract_fields(identifier);

    if record.alternate_identifier.is_empty() {
        if let Some(usdot) = page.usdot_from_links() {
            record.alternate_identifier = usdot;
        }
    }

    record.enrichment_url = page.sms_results_link(sms_origin);
    Ok(record)
}

/// Finds the "Carrier Registration Details" link on an SMS results page.
///
/// Returns the raw `href`; resolving it is the caller's job.
#[must_use]
pub fn find_registration_link(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    document
        .select(&ANCHOR_SEL)
        .filter(|a| REGISTRATION_TEXT_RE.is_match(&a.text().collect::<String>()))
        .find_map(|a| a.value().attr("href").map(str::to_owned))
        .filter(|href| !href.trim().is_empty())
}

/// Fills contact fields still empty on `record` from a registration page.
///
/// The first email token outside the service's own domains wins; labelled
/// email and phone rows only fill what is still missing.
pub fn extract_enrichment(body: &str, record: &mut CarrierRecord) {
    let document = Html::parse_document(body);

    if record.email.is_empty() {
        // Space-joined so an address in one cell cannot run into the next
        // cell's text and come out as a longer bogus token.
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");
        if let Some(email) = EMAIL_RE
            .find_iter(&text)
            .map(|m| m.as_str())
            .find(|email| !is_service_email(email))
        {
            record.email = email.to_owned();
        }
    }

    for pair in rows::label_value_pairs(&document) {
        if pair.label.contains("email") || pair.label.contains("e-mail") {
            if record.email.is_empty() && pair.value.contains('@') {
                record.email.clone_from(&pair.value);
            }
        } else if pair.label.contains("phone") && record.phone_number.is_empty() {
            if let Some(phone) = clean_phone(&pair.value) {
                record.phone_number = phone;
            }
        }
    }

    clean_record(record);
}

fn is_service_email(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let domain = domain.to_ascii_lowercase();
    SERVICE_EMAIL_DOMAINS
        .iter()
        .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
}

fn clean_record(record: &mut CarrierRecord) {
    for field in record.text_fields_mut() {
        *field = clean_text(field);
    }
}

#[cfg(test)]
#[path = "../extract_test.rs"]
mod tests;
