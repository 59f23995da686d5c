mod common;

use common::{advance, drain, harness};
use sandman::kernel::telemetry::TelemetryRecorder;
use sandman::kernel::{ActuationRequest, KernelEvent, StopReason};
use sandman::parts::Direction;
use sandman::routines::{RoutineDefinition, Step};

#[tokio::test(start_paused = true)]
async fn test_snapshot_counts_a_session() {
    let routine = RoutineDefinition::new("massage", vec![Step::movement("legs", Direction::Raise)]);
    let mut h = harness(vec![routine]);
    let mut recorder = TelemetryRecorder::new();

    h.controller
        .move_part(ActuationRequest::direct("back", Direction::Raise))
        .await
        .unwrap();
    h.controller
        .move_part(ActuationRequest::direct("back", Direction::Lower))
        .await
        .unwrap();
    h.engine.start("massage").await;
    advance(2100).await;

    for event in drain(&mut h.events) {
        recorder.record(event);
    }
    let snapshot = recorder.snapshot();

    assert_eq!(snapshot.actuation_stats.started, 3);
    assert_eq!(snapshot.actuation_stats.direct, 2);
    assert_eq!(snapshot.actuation_stats.preempted, 1);
    assert_eq!(snapshot.actuation_stats.elapsed, 2);
    assert_eq!(snapshot.routine_stats.started, 1);
    assert_eq!(snapshot.routine_stats.completed, 1);
    assert!((snapshot.routine_stats.completion_ratio - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_recorder_is_bounded() {
    let mut recorder = TelemetryRecorder::with_capacity(3);
    for _ in 0..5 {
        recorder.record(KernelEvent::PartStopped {
            part: "back".to_string(),
            reason: StopReason::Requested,
        });
    }
    assert_eq!(recorder.len(), 3);
    assert_eq!(recorder.snapshot().actuation_stats.requested_stops, 3);

    recorder.clear();
    assert!(recorder.is_empty());
    assert_eq!(recorder.snapshot().routine_stats.completion_ratio, 0.0);
}
