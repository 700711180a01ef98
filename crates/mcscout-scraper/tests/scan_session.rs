//! Integration tests for `SessionManager` driving full scans against a
//! `wiremock` snapshot service.

mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use mcscout_core::{AcquisitionRequest, EntityType};
use mcscout_scraper::{CompletionReason, ProgressEvent, SessionError, SessionManager, Summary};
use tokio::sync::{mpsc, oneshot};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{not_found_page, snapshot_page, test_config};

async fn mount_snapshot(server: &MockServer, mc: u64, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/query.asp"))
        .and(body_string_contains(format!("query_string={mc}")))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Answers every identifier not otherwise mocked with "Record Not Found".
async fn mount_not_found_fallback(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/query.asp"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(not_found_page())
                .set_delay(delay),
        )
        .with_priority(10)
        .mount(server)
        .await;
}

fn page(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body)
}

fn request(start: u64, end: Option<u64>) -> AcquisitionRequest {
    AcquisitionRequest::new(start, end, EntityType::Carrier).expect("valid request")
}

#[tokio::test]
async fn scan_collects_accepted_records_and_completes_once() {
    let server = MockServer::start().await;
    mount_snapshot(&server, 5, page(snapshot_page(5, "ACME TRUCKING LLC", "", false))).await;
    mount_snapshot(&server, 6, page(not_found_page())).await;
    mount_snapshot(
        &server,
        7,
        page(snapshot_page(7, "PARKED LLC", "05/01/2020", false)),
    )
    .await;

    let manager = SessionManager::new(test_config(&server));
    let events = Arc::new(Mutex::new(Vec::<ProgressEvent>::new()));
    let sink = Arc::clone(&events);
    let completions = Arc::new(Mutex::new(Vec::<Summary>::new()));
    let completion_sink = Arc::clone(&completions);

    let handle = manager
        .start_session(
            request(5, Some(7)),
            move |event| sink.lock().unwrap().push(event),
            move |summary| completion_sink.lock().unwrap().push(summary),
        )
        .expect("session starts");
    handle.await.expect("scan task completes");

    let statuses: Vec<String> = events
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.status.to_string())
        .collect();
    assert_eq!(statuses, vec!["valid", "Not found", "Invalid (filtered out)"]);

    let records = manager.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].legal_name, "ACME TRUCKING LLC");
    assert!(records.iter().all(|r| !r.legal_name.trim().is_empty()));

    let status = manager.status();
    assert!(!status.scraping_active);
    assert_eq!(status.data_count, 1);
    assert_eq!(status.last_event.map(|e| e.identifier), Some(7));

    let completions = completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].found, 1);
    assert_eq!(completions[0].checked, 3);
    assert_eq!(completions[0].reason, CompletionReason::RangeExhausted);
}

#[tokio::test]
async fn transport_failure_does_not_halt_the_scan() {
    let server = MockServer::start().await;
    mount_snapshot(&server, 5, ResponseTemplate::new(502)).await;
    mount_snapshot(&server, 6, page(snapshot_page(6, "ACME TRUCKING LLC", "", false))).await;

    let manager = SessionManager::new(test_config(&server));
    let events = Arc::new(Mutex::new(Vec::<ProgressEvent>::new()));
    let sink = Arc::clone(&events);

    manager
        .start_session(
            request(5, Some(6)),
            move |event| sink.lock().unwrap().push(event),
            |_| {},
        )
        .expect("session starts")
        .await
        .expect("scan task completes");

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].status.to_string().starts_with("Error: "));
    assert_eq!(events[1].status.to_string(), "valid");
    assert_eq!(manager.records().len(), 1);
}

#[tokio::test]
async fn pacing_delay_follows_every_identifier() {
    let server = MockServer::start().await;
    mount_not_found_fallback(&server, Duration::ZERO).await;
    let mut config = test_config(&server);
    config.pacing_delay_ms = 100;
    let manager = SessionManager::new(config);
    let events = Arc::new(Mutex::new(Vec::<ProgressEvent>::new()));
    let sink = Arc::clone(&events);

    let started = Instant::now();
    manager
        .start_session(
            request(1, Some(3)),
            move |event| sink.lock().unwrap().push(event),
            |_| {},
        )
        .expect("session starts")
        .await
        .expect("scan task completes");
    let elapsed = started.elapsed();

    assert_eq!(events.lock().unwrap().len(), 3);
    assert!(
        elapsed >= Duration::from_millis(300),
        "three identifiers should pace for 300ms, took {elapsed:?}"
    );
}

#[tokio::test]
async fn second_start_while_active_is_rejected() {
    let server = MockServer::start().await;
    mount_not_found_fallback(&server, Duration::from_millis(200)).await;

    let manager = SessionManager::new(test_config(&server));
    let (done_tx, done_rx) = oneshot::channel();
    let handle = manager
        .start_session(request(1, None), |_| {}, move |summary| {
            let _ = done_tx.send(summary);
        })
        .expect("first session starts");

    assert!(manager.status().scraping_active);
    let second = manager.start_session(request(100, Some(101)), |_| {}, |_| {});
    assert!(matches!(second, Err(SessionError::AlreadyActive)));

    assert!(manager.stop_session());
    handle.await.expect("scan task completes");
    let summary = done_rx.await.expect("completion fired");
    assert_eq!(summary.reason, CompletionReason::Stopped);
    assert!(!manager.status().scraping_active);

    // once the first scan has finished a new one may start
    manager
        .start_session(request(1, Some(1)), |_| {}, |_| {})
        .expect("restart after completion")
        .await
        .expect("scan task completes");
}

#[tokio::test]
async fn stop_lets_at_most_one_more_lookup_begin() {
    let server = MockServer::start().await;
    mount_not_found_fallback(&server, Duration::from_millis(20)).await;

    let manager = SessionManager::new(test_config(&server));
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let completions = Arc::new(Mutex::new(0_u32));
    let completion_sink = Arc::clone(&completions);

    let handle = manager
        .start_session(
            request(1, None),
            move |event| {
                let _ = progress_tx.send(event);
            },
            move |_| *completion_sink.lock().unwrap() += 1,
        )
        .expect("session starts");

    for _ in 0..3 {
        progress_rx.recv().await.expect("progress event");
    }
    assert!(manager.stop_session());
    let requests_at_stop = server.received_requests().await.expect("recording").len();

    handle.await.expect("scan task completes");
    let requests_after = server.received_requests().await.expect("recording").len();

    assert!(
        requests_after <= requests_at_stop + 1,
        "{requests_after} lookups after stop at {requests_at_stop}"
    );
    assert_eq!(*completions.lock().unwrap(), 1);
    assert!(!manager.stop_session(), "nothing left to stop");
}

#[tokio::test]
async fn inverted_range_is_rejected_without_starting() {
    let server = MockServer::start().await;
    let manager = SessionManager::new(test_config(&server));

    let inverted = AcquisitionRequest {
        start_identifier: 10,
        end_identifier: Some(5),
        entity_type: EntityType::Carrier,
    };
    let result = manager.start_session(inverted, |_| {}, |_| {});

    assert!(matches!(result, Err(SessionError::InvalidRequest(_))));
    assert!(!manager.status().scraping_active);
    assert!(server.received_requests().await.expect("recording").is_empty());
}

#[tokio::test]
async fn new_scan_discards_previous_records() {
    let server = MockServer::start().await;
    mount_snapshot(&server, 5, page(snapshot_page(5, "ACME TRUCKING LLC", "", false))).await;
    mount_not_found_fallback(&server, Duration::ZERO).await;

    let manager = SessionManager::new(test_config(&server));
    manager
        .start_session(request(5, Some(5)), |_| {}, |_| {})
        .expect("first scan")
        .await
        .expect("scan task completes");
    assert_eq!(manager.records().len(), 1);

    manager
        .start_session(request(8, Some(9)), |_| {}, |_| {})
        .expect("second scan")
        .await
        .expect("scan task completes");
    assert!(manager.records().is_empty());
    assert_eq!(manager.status().data_count, 0);
}
