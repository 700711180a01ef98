use super::*;
use mcscout_core::CarrierRecord;
use mcscout_scraper::{CompletionReason, LookupOutcome, ProgressEvent, Summary};

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["mcscout"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_bounded_scan() {
    let cli = Cli::try_parse_from([
        "mcscout", "scan", "--start", "100", "--end", "105", "--entity-type", "broker",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Scan {
            start: 100,
            end: Some(105),
            entity_type: EntityType::Broker,
            json: false,
        })
    ));
}

#[test]
fn scan_defaults_to_unbounded_carrier_scan() {
    let cli = Cli::try_parse_from(["mcscout", "scan", "--start", "1", "--json"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Scan {
            start: 1,
            end: None,
            entity_type: EntityType::Carrier,
            json: true,
        })
    ));
}

#[test]
fn scan_requires_start() {
    assert!(Cli::try_parse_from(["mcscout", "scan"]).is_err());
}

#[test]
fn unknown_entity_type_is_rejected() {
    let result = Cli::try_parse_from(["mcscout", "scan", "--start", "1", "--entity-type", "ferry"]);
    assert!(result.is_err());
}

#[test]
fn parses_lookup() {
    let cli = Cli::try_parse_from(["mcscout", "lookup", "123456"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Lookup {
            mc: 123_456,
            entity_type: EntityType::Carrier,
        })
    ));
}

fn found_event() -> ProgressEvent {
    let mut record = CarrierRecord::new(42);
    record.legal_name = "ACME TRUCKING LLC".into();
    ProgressEvent::from_outcome(42, LookupOutcome::Found(Box::new(record)))
}

#[test]
fn table_line_shows_status_and_name() {
    let line = scan::format_event(&found_event(), false)
        .expect("format")
        .expect("line");
    assert!(line.starts_with("MC 42"));
    assert!(line.contains("valid"));
    assert!(line.ends_with("ACME TRUCKING LLC"));
}

#[test]
fn json_mode_prints_only_accepted_records() {
    let line = scan::format_event(&found_event(), true)
        .expect("format")
        .expect("line");
    let json: serde_json::Value = serde_json::from_str(&line).expect("json line");
    assert_eq!(json["mc_number"], 42);
    assert_eq!(json["legal_name"], "ACME TRUCKING LLC");

    let not_found = ProgressEvent::from_outcome(
        43,
        LookupOutcome::NotFound(mcscout_scraper::NotFoundReason::IdentifierMismatch),
    );
    assert!(scan::format_event(&not_found, true).expect("format").is_none());
}

#[test]
fn summary_line_reports_counts() {
    let summary = Summary {
        checked: 10,
        found: 3,
        last_identifier: Some(109),
        reason: CompletionReason::Stopped,
    };
    assert_eq!(
        scan::format_summary(&summary),
        "scan finished: 10 checked, 3 found (Stopped)"
    );
}
