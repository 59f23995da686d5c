//! Configuration model.
//!
//! Keys follow the device files written by the bed controller (`upGPIOLine`,
//! `movingDurationMS`, ...). Validation happens once, here, and produces the
//! immutable registries the kernel runs on.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::parts::{
    Capability, Direction, LineBinding, Part, PartRegistry, DEFAULT_COOL_DOWN,
};
use crate::routines::{RoutineDefinition, RoutineRegistry, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandmanConfig {
    #[serde(default)]
    pub parts: Vec<PartConfig>,
    #[serde(default)]
    pub routines: Vec<RoutineConfig>,
    /// Grace period before accepting intents, while the speech platform comes up.
    #[serde(default, rename = "startupDelaySec")]
    pub startup_delay_sec: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartConfig {
    pub name: String,
    #[serde(rename = "upGPIOLine")]
    pub up_gpio_line: u32,
    #[serde(rename = "downGPIOLine")]
    pub down_gpio_line: u32,
    #[serde(rename = "movingDurationMS")]
    pub moving_duration_ms: u64,
    #[serde(default = "default_cool_down_ms", rename = "coolDownDurationMS")]
    pub cool_down_duration_ms: u64,
    /// Restricts the part to some directions. All directions when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions: Option<Vec<String>>,
}

fn default_cool_down_ms() -> u64 {
    DEFAULT_COOL_DOWN.as_millis() as u64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineConfig {
    pub name: String,
    #[serde(default, rename = "isLooping")]
    pub is_looping: bool,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Pause before the step's move.
    #[serde(default, rename = "delayMS")]
    pub delay_ms: u64,
    #[serde(default, rename = "controlName", skip_serializing_if = "Option::is_none")]
    pub control_name: Option<String>,
    #[serde(default, rename = "moveDirection", skip_serializing_if = "Option::is_none")]
    pub move_direction: Option<String>,
    #[serde(default, rename = "durationMS", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub concurrent: bool,
}

/// Validated, frozen configuration shared by every component.
#[derive(Debug, Clone)]
pub struct Registries {
    pub parts: Arc<PartRegistry>,
    pub routines: Arc<RoutineRegistry>,
}

impl SandmanConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loading config");
        Self::from_json_str(&json)
    }

    /// The stock three-part bed, used when no config file exists.
    pub fn bedside_default() -> Self {
        let part = |name: &str, up: u32, down: u32, ms: u64| PartConfig {
            name: name.to_string(),
            up_gpio_line: up,
            down_gpio_line: down,
            moving_duration_ms: ms,
            cool_down_duration_ms: default_cool_down_ms(),
            directions: None,
        };
        Self {
            parts: vec![
                part("back", 20, 16, 7000),
                part("legs", 13, 26, 4000),
                part("elevation", 5, 19, 4000),
            ],
            routines: Vec::new(),
            startup_delay_sec: 0,
        }
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_sec)
    }

    pub fn build(&self) -> Result<Registries, ConfigError> {
        let parts = self
            .parts
            .iter()
            .map(PartConfig::to_part)
            .collect::<Result<Vec<_>, _>>()?;
        let parts = PartRegistry::new(parts)?;

        let routines = self
            .routines
            .iter()
            .map(RoutineConfig::to_definition)
            .collect::<Result<Vec<_>, _>>()?;
        let routines = RoutineRegistry::new(routines, &parts)?;

        Ok(Registries {
            parts: Arc::new(parts),
            routines: Arc::new(routines),
        })
    }
}

impl PartConfig {
    fn to_part(&self) -> Result<Part, ConfigError> {
        let capability = match &self.directions {
            None => Capability::BOTH,
            Some(directions) => {
                let mut capability = Capability { raise: false, lower: false };
                for raw in directions {
                    match raw.parse::<Direction>()? {
                        Direction::Raise => capability.raise = true,
                        Direction::Lower => capability.lower = true,
                    }
                }
                capability
            }
        };

        Ok(Part {
            name: self.name.clone(),
            capability,
            duration: Duration::from_millis(self.moving_duration_ms),
            cool_down: Duration::from_millis(self.cool_down_duration_ms),
            binding: LineBinding {
                up: self.up_gpio_line,
                down: self.down_gpio_line,
            },
        })
    }
}

impl RoutineConfig {
    fn to_definition(&self) -> Result<RoutineDefinition, ConfigError> {
        let mut steps = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            let invalid = |reason: &str| ConfigError::InvalidStep {
                routine: self.name.clone(),
                step: index,
                reason: reason.to_string(),
            };

            if step.delay_ms > 0 {
                steps.push(Step::Pause(Duration::from_millis(step.delay_ms)));
            }

            match (&step.control_name, &step.move_direction) {
                (Some(part), Some(direction)) => steps.push(Step::Move {
                    part: part.clone(),
                    direction: direction.parse()?,
                    duration: step.duration_ms.map(Duration::from_millis),
                    concurrent: step.concurrent,
                }),
                (Some(_), None) => return Err(invalid("missing move direction")),
                (None, Some(_)) => return Err(invalid("missing control name")),
                (None, None) if step.delay_ms == 0 => return Err(invalid("step does nothing")),
                (None, None) => {}
            }
        }

        Ok(RoutineDefinition {
            name: self.name.clone(),
            steps,
            looping: self.is_looping,
        })
    }
}
