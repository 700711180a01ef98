//! Scan and lookup command handlers.
//!
//! Human-readable progress goes to stdout unless `--json` is set, in which
//! case stdout carries only accepted records and everything else goes to
//! stderr.

use mcscout_core::{AcquisitionRequest, AppConfig, EntityType};
use mcscout_scraper::{
    CarrierScraper, LookupOutcome, ProgressEvent, SessionManager, Summary,
};
use tokio::sync::{mpsc, oneshot};

/// Runs a range scan to completion, or until Ctrl-C asks it to stop.
///
/// # Errors
///
/// Returns an error if the session cannot start, the scan task panics, or a
/// record cannot be serialized.
pub(crate) async fn run_scan(
    config: AppConfig,
    request: AcquisitionRequest,
    json: bool,
) -> anyhow::Result<()> {
    let manager = SessionManager::new(config);
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let (done_tx, done_rx) = oneshot::channel();

    let handle = manager.start_session(
        request,
        move |event| {
            let _ = progress_tx.send(event);
        },
        move |summary| {
            let _ = done_tx.send(summary);
        },
    )?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stopping = false;

    loop {
        tokio::select! {
            event = progress_rx.recv() => {
                let Some(event) = event else { break };
                if let Some(line) = format_event(&event, json)? {
                    println!("{line}");
                }
            }
            result = &mut ctrl_c, if !stopping => {
                result?;
                eprintln!("stopping after the current MC number...");
                manager.stop_session();
                stopping = true;
            }
        }
    }

    if let Err(e) = handle.await {
        tracing::error!(error = %e, "scan task ended abnormally");
    }
    let summary = done_rx
        .await
        .map_err(|_| anyhow::anyhow!("scan ended without a completion summary"))?;

    let line = format_summary(&summary);
    if json {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
    Ok(())
}

/// Looks up one MC number and prints the outcome.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the snapshot request
/// fails, or the record cannot be serialized.
pub(crate) async fn run_lookup(
    config: &AppConfig,
    mc: u64,
    entity_type: EntityType,
) -> anyhow::Result<()> {
    let scraper = CarrierScraper::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

    match scraper.lookup_carrier(mc, entity_type).await {
        LookupOutcome::Found(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        LookupOutcome::NotFound(reason) => println!("MC {mc}: not found ({reason})"),
        LookupOutcome::Rejected(reason) => println!("MC {mc}: filtered out ({reason})"),
        LookupOutcome::TransportFailure(message) => {
            anyhow::bail!("lookup of MC {mc} failed: {message}")
        }
    }
    Ok(())
}

/// Renders one progress event; `None` when there is nothing to print.
///
/// In JSON mode only accepted records are printed.
pub(crate) fn format_event(event: &ProgressEvent, json: bool) -> anyhow::Result<Option<String>> {
    if json {
        return match &event.record {
            Some(record) => Ok(Some(serde_json::to_string(record)?)),
            None => {
                tracing::info!(identifier = event.identifier, status = %event.status, "checked");
                Ok(None)
            }
        };
    }

    let name = event
        .record
        .as_ref()
        .map(|r| r.legal_name.as_str())
        .unwrap_or_default();
    let label = format!("MC {}", event.identifier);
    Ok(Some(
        format!("{label:<14}{:<26}{name}", event.status.to_string())
            .trim_end()
            .to_owned(),
    ))
}

pub(crate) fn format_summary(summary: &Summary) -> String {
    format!(
        "scan finished: {} checked, {} found ({:?})",
        summary.checked, summary.found, summary.reason
    )
}
