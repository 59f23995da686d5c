//! Spoken response text. Pure functions: outcome in, sentence out.

use crate::kernel::{Lifecycle, MoveOutcome, StartOutcome, StatusReport, StopOutcome};
use crate::parts::Direction;

pub fn moving(part: &str, direction: Direction, outcome: MoveOutcome) -> String {
    let verb = capitalize(direction.progressive());
    match outcome {
        MoveOutcome::Accepted => format!("{} the {}.", verb, part),
        MoveOutcome::Superseded => {
            format!("{} the {}, interrupting its previous motion.", verb, part)
        }
    }
}

pub fn unknown_part(part: &str) -> String {
    format!("There is no part named {}.", part)
}

pub fn unsupported_direction(part: &str, direction: Direction) -> String {
    format!("The {} cannot be {}.", part, direction.past_participle())
}

pub fn driver_failure(part: &str) -> String {
    format!("Sorry, something went wrong moving the {}.", part)
}

pub fn routine_started(name: &str, outcome: StartOutcome) -> String {
    match outcome {
        StartOutcome::Started => format!("Routine {} started.", name),
        StartOutcome::AlreadyRunning => format!("Routine {} is already running.", name),
        StartOutcome::StillStopping => {
            format!("Routine {} is still stopping. Try again in a moment.", name)
        }
        StartOutcome::NotFound => format!("No routine named {}.", name),
    }
}

pub fn routine_stopped(name: &str, outcome: StopOutcome) -> String {
    match outcome {
        StopOutcome::Stopped => format!("Routine {} stopped.", name),
        StopOutcome::NotRunning => format!("Routine {} was not running.", name),
        StopOutcome::NotFound => format!("No routine named {}.", name),
    }
}

pub fn routine_finished(name: &str) -> String {
    format!("Routine {} finished.", name)
}

pub fn status(report: &StatusReport) -> String {
    let mut sentences = Vec::new();

    if report.routines.is_empty() {
        sentences.push("No routines running.".to_string());
    } else {
        let names: Vec<String> = report
            .routines
            .iter()
            .map(|routine| match routine.lifecycle {
                Lifecycle::Stopping => format!("{} (stopping)", routine.name),
                _ => routine.name.clone(),
            })
            .collect();
        sentences.push(format!("Running routines: {}.", names.join(", ")));
    }

    for activity in &report.moving {
        sentences.push(format!("The {} is {}.", activity.part, activity.direction.progressive()));
    }

    sentences.join(" ")
}

pub fn clarification() -> String {
    "Sorry, I didn't understand that.".to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
