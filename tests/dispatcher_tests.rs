mod common;

use common::{advance, harness};
use sandman::driver::DriverCall;
use sandman::parts::Direction;
use sandman::routines::{RoutineDefinition, Step};
use sandman::Intent;

fn massage() -> RoutineDefinition {
    RoutineDefinition::new(
        "massage",
        vec![Step::movement("legs", Direction::Raise), Step::movement("legs", Direction::Lower)],
    )
}

fn move_part(direction: Direction, part: &str) -> Intent {
    Intent::MovePart {
        direction,
        part: part.to_string(),
    }
}

fn start(name: &str) -> Intent {
    Intent::StartRoutine { name: name.to_string() }
}

fn stop(name: &str) -> Intent {
    Intent::StopRoutine { name: name.to_string() }
}

#[tokio::test(start_paused = true)]
async fn test_move_then_status() {
    let h = harness(vec![]);

    let response = h.dispatcher.handle(&move_part(Direction::Lower, "back")).await;
    assert_eq!(response, "Lowering the back.");

    let status = h.dispatcher.handle(&Intent::GetStatus).await;
    assert!(status.contains("No routines running."), "{}", status);
    assert!(status.contains("The back is lowering."), "{}", status);

    advance(2001).await;
    assert_eq!(h.dispatcher.handle(&Intent::GetStatus).await, "No routines running.");
}

#[tokio::test(start_paused = true)]
async fn test_massage_start_again_and_stop() {
    let h = harness(vec![massage()]);

    assert_eq!(h.dispatcher.handle(&start("massage")).await, "Routine massage started.");
    assert_eq!(h.dispatcher.handle(&start("massage")).await, "Routine massage is already running.");

    advance(100).await;
    let status = h.dispatcher.handle(&Intent::GetStatus).await;
    assert!(status.contains("Running routines: massage."), "{}", status);

    assert_eq!(h.dispatcher.handle(&stop("massage")).await, "Routine massage stopped.");
    let status = h.dispatcher.handle(&Intent::GetStatus).await;
    assert!(status.contains("massage (stopping)"), "{}", status);

    advance(3000).await;
    assert!(!h
        .driver
        .calls_for("legs")
        .contains(&DriverCall::Drive("legs".into(), Direction::Lower)));
    assert_eq!(h.dispatcher.handle(&stop("massage")).await, "Routine massage was not running.");
}

#[tokio::test(start_paused = true)]
async fn test_direct_command_interrupts_routine() {
    let h = harness(vec![massage()]);

    h.dispatcher.handle(&start("massage")).await;
    advance(200).await;

    let response = h.dispatcher.handle(&move_part(Direction::Raise, "legs")).await;
    assert_eq!(response, "Raising the legs, interrupting its previous motion.");

    let state = h.controller.state_of("legs").await.unwrap();
    assert!(state.actuation().unwrap().context.is_direct());
}

#[tokio::test(start_paused = true)]
async fn test_error_phrases() {
    let h = harness(vec![]);

    assert_eq!(
        h.dispatcher.handle(&move_part(Direction::Raise, "headboard")).await,
        "There is no part named headboard."
    );
    assert_eq!(
        h.dispatcher.handle(&move_part(Direction::Lower, "elevation")).await,
        "The elevation cannot be lowered."
    );
    assert_eq!(h.dispatcher.handle(&start("nap")).await, "No routine named nap.");
    assert_eq!(h.dispatcher.handle(&stop("nap")).await, "No routine named nap.");

    h.driver.fail_drives("legs");
    assert_eq!(
        h.dispatcher.handle(&move_part(Direction::Raise, "legs")).await,
        "Sorry, something went wrong moving the legs."
    );
}

#[tokio::test(start_paused = true)]
async fn test_part_names_are_case_insensitive() {
    let h = harness(vec![]);

    let response = h.dispatcher.handle(&move_part(Direction::Raise, "  Back ")).await;
    assert_eq!(response, "Raising the back.");
}

#[tokio::test(start_paused = true)]
async fn test_routine_responses_use_canonical_names() {
    let h = harness(vec![massage()]);

    assert_eq!(h.dispatcher.handle(&start("  Massage ")).await, "Routine massage started.");
    assert_eq!(h.dispatcher.handle(&stop("MASSAGE")).await, "Routine massage stopped.");
    assert_eq!(h.dispatcher.handle(&start(" Nap ")).await, "No routine named Nap.");
}

#[tokio::test(start_paused = true)]
async fn test_handles_raw_payloads() {
    let h = harness(vec![massage()]);

    let payload = r#"{
        "intent": {"intentName": "MovePart"},
        "slots": [
            {"slotName": "direction", "rawValue": "down"},
            {"slotName": "name", "rawValue": "legs"}
        ]
    }"#;
    assert_eq!(h.dispatcher.handle_json(payload).await, "Lowering the legs.");

    let payload = r#"{
        "intent": {"intentName": "StartRoutine"},
        "slots": [{"slotName": "name", "rawValue": "massage"}]
    }"#;
    assert_eq!(h.dispatcher.handle_json(payload).await, "Routine massage started.");

    assert_eq!(h.dispatcher.handle_json("not json").await, "Sorry, I didn't understand that.");
    assert_eq!(
        h.dispatcher.handle_json(r#"{"intent": {"intentName": "Dance"}}"#).await,
        "Sorry, I didn't understand that."
    );
}
