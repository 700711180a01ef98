//! Page fixtures and config shared by the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use mcscout_core::{AppConfig, Environment};
use mcscout_scraper::{CarrierScraper, Endpoints, PageFetcher};
use wiremock::MockServer;

pub const USDOT: &str = "1234567";

/// A snapshot page for `mc`. `sms_link` adds the SMS results link used to
/// start enrichment.
pub fn snapshot_page(mc: u64, legal_name: &str, oos: &str, sms_link: bool) -> String {
    let sms = if sms_link {
        format!(
            r#"<a href="/SMS/Carrier/{USDOT}/CarrierOverview.aspx?safer_xfr=1&amp;DOT={USDOT}">SMS Results</a>"#
        )
    } else {
        String::new()
    };
    format!(
        r#"<html><body>
<table>
  <tr><th>Entity Type:</th><td>CARRIER</td></tr>
  <tr><th>USDOT Status:</th><td>ACTIVE</td><th>Out of Service Date:</th><td>{oos}</td></tr>
  <tr><th>USDOT Number:</th><td>{USDOT}</td></tr>
  <tr><th>MC/MX/FF Number(s):</th><td>MC-{mc}</td></tr>
  <tr><th>Legal Name:</th><td>{legal_name}</td></tr>
  <tr><th>Physical Address:</th><td>123 MAIN ST<br>SPRINGFIELD, IL 62701</td></tr>
  <tr><th>Phone:</th><td>(217) 555-0100</td></tr>
</table>
{sms}
</body></html>"#
    )
}

pub fn not_found_page() -> String {
    "<html><body><p>Record Not Found</p></body></html>".to_owned()
}

pub fn sms_results_page() -> String {
    format!(
        r#"<html><body>
<a href="/SMS/Carrier/{USDOT}/InspectionHistory.aspx">Inspection History</a>
<a href="/SMS/Carrier/{USDOT}/CarrierRegistration.aspx">Carrier Registration Details</a>
</body></html>"#
    )
}

pub fn registration_page() -> String {
    r"<html><body>
<p>Questions about this page? Contact help@dot.gov</p>
<table>
  <tr><th>Email:</th><td>ops@acmetrucking.com</td></tr>
  <tr><th>Cell Phone:</th><td>(312) 555-0199</td></tr>
</table>
</body></html>"
        .to_owned()
}

pub fn endpoints(server: &MockServer) -> Endpoints {
    Endpoints {
        snapshot_url: format!("{}/query.asp", server.uri()),
        snapshot_origin: server.uri(),
        sms_origin: server.uri(),
    }
}

/// Scraper pointed at `server` with no politeness delay.
pub fn test_scraper(server: &MockServer) -> CarrierScraper {
    let fetcher = PageFetcher::new(5, "mcscout-test/0.1").expect("failed to build test fetcher");
    CarrierScraper::new(fetcher, endpoints(server), Duration::ZERO)
}

/// Config pointed at `server` with every delay zeroed.
pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("valid addr"),
        log_level: "debug".to_owned(),
        snapshot_url: format!("{}/query.asp", server.uri()),
        snapshot_origin: server.uri(),
        sms_origin: server.uri(),
        request_timeout_secs: 5,
        user_agent: "mcscout-test/0.1".to_owned(),
        pacing_delay_ms: 0,
        politeness_delay_ms: 0,
    }
}
