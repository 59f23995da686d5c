use std::collections::HashMap;
use std::time::Duration;

use tracing::info;

use super::types::Part;
use crate::error::ConfigError;

/// Longest a single movement may ever last.
pub const MAX_ACTUATION: Duration = Duration::from_secs(60);

/// Longest a part may be held quiet between movements.
pub const MAX_COOL_DOWN: Duration = Duration::from_secs(5);

/// Cool-down used when a device file does not set one.
pub const DEFAULT_COOL_DOWN: Duration = Duration::from_millis(25);

/// Part names are matched case-insensitively; speech rarely agrees on case.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Read-only set of configured parts, safe to share across every component.
#[derive(Debug, Clone, Default)]
pub struct PartRegistry {
    parts: HashMap<String, Part>,
    // Insertion order, for stable status output.
    order: Vec<String>,
}

impl PartRegistry {
    /// Validates and freezes the part set. Any problem is a startup failure.
    pub fn new(parts: Vec<Part>) -> Result<Self, ConfigError> {
        let mut registry = PartRegistry::default();
        let mut line_owners: HashMap<u32, String> = HashMap::new();

        for mut part in parts {
            part.name = normalize_name(&part.name);

            if part.name.is_empty() {
                return Err(ConfigError::EmptyName { kind: "part" });
            }
            if registry.parts.contains_key(&part.name) {
                return Err(ConfigError::DuplicatePart(part.name));
            }
            if part.duration.is_zero() {
                return Err(ConfigError::NonPositiveDuration { part: part.name });
            }
            if part.duration > MAX_ACTUATION {
                return Err(ConfigError::DurationTooLong {
                    part: part.name,
                    duration: part.duration,
                    limit: MAX_ACTUATION,
                });
            }
            if part.cool_down > MAX_COOL_DOWN {
                return Err(ConfigError::CoolDownTooLong {
                    part: part.name,
                    duration: part.cool_down,
                    limit: MAX_COOL_DOWN,
                });
            }
            if part.capability.is_empty() {
                return Err(ConfigError::NoDirections(part.name));
            }
            if part.binding.up == part.binding.down {
                return Err(ConfigError::SameLine {
                    line: part.binding.up,
                    part: part.name,
                });
            }
            for line in [part.binding.up, part.binding.down] {
                if let Some(first) = line_owners.insert(line, part.name.clone()) {
                    return Err(ConfigError::SharedLine {
                        line,
                        first,
                        second: part.name,
                    });
                }
            }

            info!(
                part = %part.name,
                up = part.binding.up,
                down = part.binding.down,
                duration_ms = part.duration.as_millis() as u64,
                cool_down_ms = part.cool_down.as_millis() as u64,
                "Registered part"
            );
            registry.order.push(part.name.clone());
            registry.parts.insert(part.name.clone(), part);
        }

        Ok(registry)
    }

    pub fn lookup(&self, name: &str) -> Option<&Part> {
        self.parts.get(&normalize_name(name))
    }

    /// Parts in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.order.iter().filter_map(|name| self.parts.get(name))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::types::{Capability, LineBinding};

    fn part(name: &str, ms: u64, up: u32, down: u32) -> Part {
        Part {
            name: name.to_string(),
            capability: Capability::BOTH,
            duration: Duration::from_millis(ms),
            cool_down: Duration::ZERO,
            binding: LineBinding { up, down },
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = PartRegistry::new(vec![part("Back", 2000, 20, 16)]).unwrap();
        assert!(registry.lookup("back").is_some());
        assert!(registry.lookup(" BACK ").is_some());
        assert!(registry.lookup("legs").is_none());
    }

    #[test]
    fn test_rejects_duplicates_and_zero_duration() {
        let dup = PartRegistry::new(vec![part("back", 2000, 1, 2), part("BACK", 1000, 3, 4)]);
        assert!(matches!(dup, Err(ConfigError::DuplicatePart(name)) if name == "back"));

        let zero = PartRegistry::new(vec![part("legs", 0, 1, 2)]);
        assert!(matches!(zero, Err(ConfigError::NonPositiveDuration { .. })));

        let mut sluggish = part("legs", 1000, 1, 2);
        sluggish.cool_down = Duration::from_secs(10);
        let sluggish = PartRegistry::new(vec![sluggish]);
        assert!(matches!(sluggish, Err(ConfigError::CoolDownTooLong { .. })));
    }

    #[test]
    fn test_rejects_line_conflicts() {
        let same = PartRegistry::new(vec![part("back", 2000, 5, 5)]);
        assert!(matches!(same, Err(ConfigError::SameLine { line: 5, .. })));

        let shared = PartRegistry::new(vec![part("back", 2000, 1, 2), part("legs", 1500, 2, 3)]);
        assert!(matches!(shared, Err(ConfigError::SharedLine { line: 2, .. })));
    }

    #[test]
    fn test_preserves_configuration_order() {
        let registry = PartRegistry::new(vec![
            part("legs", 1500, 13, 26),
            part("back", 2000, 20, 16),
        ])
        .unwrap();
        let names: Vec<_> = registry.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["legs", "back"]);
    }
}
