use std::collections::HashMap;

use tracing::info;

use super::types::{RoutineDefinition, Step};
use crate::error::ConfigError;
use crate::parts::{normalize_name, PartRegistry};

/// Immutable routine definitions, validated against the parts they drive.
#[derive(Debug, Clone, Default)]
pub struct RoutineRegistry {
    routines: HashMap<String, RoutineDefinition>,
}

impl RoutineRegistry {
    pub fn new(
        definitions: Vec<RoutineDefinition>,
        parts: &PartRegistry,
    ) -> Result<Self, ConfigError> {
        let mut routines = HashMap::new();

        for mut def in definitions {
            def.name = normalize_name(&def.name);
            if def.name.is_empty() {
                return Err(ConfigError::EmptyName { kind: "routine" });
            }
            if routines.contains_key(&def.name) {
                return Err(ConfigError::DuplicateRoutine(def.name));
            }

            for (index, step) in def.steps.iter_mut().enumerate() {
                let Step::Move { part, direction, duration, .. } = step else {
                    continue;
                };
                let Some(found) = parts.lookup(part) else {
                    return Err(ConfigError::UnknownPart {
                        routine: def.name.clone(),
                        step: index,
                        part: part.clone(),
                    });
                };
                if !found.supports(*direction) {
                    return Err(ConfigError::UnsupportedDirection {
                        routine: def.name.clone(),
                        step: index,
                        part: found.name.clone(),
                    });
                }
                if duration.is_some_and(|d| d.is_zero()) {
                    return Err(ConfigError::InvalidStep {
                        routine: def.name.clone(),
                        step: index,
                        reason: "duration override must be positive".to_string(),
                    });
                }
                *part = found.name.clone();
            }

            // A looping routine that never waits would spin forever.
            if def.looping && !def.steps.iter().any(Step::waits) {
                return Err(ConfigError::LoopWithoutWait(def.name));
            }

            info!(
                routine = %def.name,
                steps = def.steps.len(),
                looping = def.looping,
                "Registered routine"
            );
            routines.insert(def.name.clone(), def);
        }

        Ok(Self { routines })
    }

    pub fn lookup(&self, name: &str) -> Option<&RoutineDefinition> {
        self.routines.get(&normalize_name(name))
    }

    /// Routine names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.routines.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}
