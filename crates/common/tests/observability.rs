use metrics_exporter_prometheus::PrometheusBuilder;

// NOTE: This is an integration test so it exercises the public API surface
// (`common::observability`) instead of reaching into private internals.

#[test]
fn tracing_error_events_counter_increments_on_error_event() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::with_local_recorder(&recorder, || {
        let dispatch = common::observability::build_dispatch("test-service", "info");

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!(wallet_id = "0xabc", "feature row rejected");
        });
    });

    let rendered = handle.render();
    assert!(
        rendered.contains("tracing_error_events"),
        "expected tracing_error_events in rendered metrics, got:\n{rendered}"
    );
    assert!(
        rendered.contains(r#"service="test-service""#),
        "expected per-service label in rendered metrics, got:\n{rendered}"
    );
}

#[test]
fn info_events_do_not_count_as_errors() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::with_local_recorder(&recorder, || {
        let dispatch = common::observability::build_dispatch("test-service", "info");

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(wallets = 3, "batch scored");
            tracing::warn!("duplicate wallet id dropped");
        });
    });

    let rendered = handle.render();
    assert!(
        !rendered.contains("tracing_error_events"),
        "no ERROR events were emitted, got:\n{rendered}"
    );
}
