mod support;

use std::time::Duration;

use installer_client::{follow_event_stream, ReqwestInstallerApi};
use installer_core::{Action, InstallEvent};
use pretty_assertions::assert_eq;
use support::{settings_for, sse_body, TestSink};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn reconnects_after_early_close_and_resumes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[r#"{"type":"status","description":"booting"}"#]),
            "text/event-stream",
        ))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[
                r#"{"type":"status","description":"ready"}"#,
                r#"{"type":"done"}"#,
            ]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(server.uri());
    let api = ReqwestInstallerApi::new(settings.clone()).unwrap();
    let sink = TestSink::new();
    follow_event_stream(&api, &settings, "install-1", &sink).await;

    assert_eq!(
        sink.take(),
        vec![
            Action::InstallEvent(InstallEvent::new("booting")),
            Action::InstallEvent(InstallEvent::new("ready")),
            Action::InstallDone,
        ]
    );
    server.verify().await;
}

#[tokio::test]
async fn gives_up_after_reconnect_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut settings = settings_for(server.uri());
    settings.max_reconnects = 2;
    let api = ReqwestInstallerApi::new(settings.clone()).unwrap();
    let sink = TestSink::new();
    follow_event_stream(&api, &settings, "install-1", &sink).await;

    let actions = sink.take();
    assert_eq!(actions.len(), 1);
    assert!(matches!(&actions[0], Action::InstallFailed { message } if message.contains("503")));
    server.verify().await;
}

#[tokio::test]
async fn server_error_event_ends_stream_without_reconnect() {
    let server = MockServer::start().await;
    let body = "data: {\"type\":\"status\",\"description\":\"booting\"}\n\n\
                event: error\ndata: \"stack rollback\"\n\n";
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(server.uri());
    let api = ReqwestInstallerApi::new(settings.clone()).unwrap();
    let sink = TestSink::new();
    follow_event_stream(&api, &settings, "install-1", &sink).await;

    assert_eq!(
        sink.take(),
        vec![
            Action::InstallEvent(InstallEvent::new("booting")),
            Action::InstallFailed {
                message: "stack rollback".to_string()
            },
        ]
    );
    server.verify().await;
}

#[tokio::test]
async fn record_delivery_resets_the_failure_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[r#"{"type":"status","description":"booting"}"#]),
            "text/event-stream",
        ))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[r#"{"type":"done"}"#]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    // Two failed connections in total, but never two in a row.
    let mut settings = settings_for(server.uri());
    settings.max_reconnects = 1;
    let api = ReqwestInstallerApi::new(settings.clone()).unwrap();
    let sink = TestSink::new();
    follow_event_stream(&api, &settings, "install-1", &sink).await;

    assert_eq!(
        sink.take(),
        vec![
            Action::InstallEvent(InstallEvent::new("booting")),
            Action::InstallDone,
        ]
    );
    server.verify().await;
}

#[tokio::test]
async fn silent_server_counts_as_failed_connection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/install-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(10))
                .set_body_raw(sse_body(&[r#"{"type":"done"}"#]), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings_for(server.uri());
    settings.max_reconnects = 0;
    settings.stream_idle_timeout = Duration::from_millis(100);
    let api = ReqwestInstallerApi::new(settings.clone()).unwrap();
    let sink = TestSink::new();
    tokio::time::timeout(
        Duration::from_secs(5),
        follow_event_stream(&api, &settings, "install-1", &sink),
    )
    .await
    .expect("follower gave up on its own");

    let actions = sink.take();
    assert_eq!(actions.len(), 1);
    assert!(matches!(
        &actions[0],
        Action::InstallFailed { message } if message.contains("no data from installer")
    ));
    server.verify().await;
}
