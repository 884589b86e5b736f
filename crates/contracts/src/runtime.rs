//! Runtime handles and simulator-side state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulator actor handle
pub type ActorId = u32;

/// Simulator frame number returned by a tick
pub type TickId = u64;

/// World settings as read from / applied to the simulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSettings {
    /// Server waits for a client tick before advancing
    pub synchronous_mode: bool,

    /// Fixed simulation step (seconds); `None` = variable step
    pub fixed_delta_seconds: Option<f64>,

    pub no_rendering_mode: bool,
}

impl WorldSettings {
    /// Copy of these settings switched to lock-step mode
    pub fn synchronous(self, fixed_delta_seconds: f64) -> Self {
        Self {
            synchronous_mode: true,
            fixed_delta_seconds: Some(fixed_delta_seconds),
            ..self
        }
    }
}

/// Vehicle blueprint selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintFilter {
    /// Glob over blueprint ids, e.g. `vehicle.*`
    pub pattern: String,

    /// Keep only blueprints with this many wheels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheels: Option<u32>,
}

impl BlueprintFilter {
    /// Whether a blueprint id matches the pattern. Only `*` wildcards are supported.
    pub fn matches_id(&self, id: &str) -> bool {
        glob_match(&self.pattern, id)
    }
}

impl Default for BlueprintFilter {
    fn default() -> Self {
        Self {
            pattern: "vehicle.*".to_string(),
            wheels: None,
        }
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

/// How a spawn point is chosen among the map's recommended points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "index")]
pub enum SpawnPointPolicy {
    #[default]
    Random,
    Index(usize),
}

/// Teardown progress, strictly forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShutdownState {
    Running,
    Stopping,
    Destroyed,
    SettingsRestored,
}

impl ShutdownState {
    /// Next state in the teardown sequence, `None` once settings are restored
    pub fn next(self) -> Option<Self> {
        match self {
            ShutdownState::Running => Some(ShutdownState::Stopping),
            ShutdownState::Stopping => Some(ShutdownState::Destroyed),
            ShutdownState::Destroyed => Some(ShutdownState::SettingsRestored),
            ShutdownState::SettingsRestored => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == ShutdownState::SettingsRestored
    }
}

impl fmt::Display for ShutdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShutdownState::Running => "RUNNING",
            ShutdownState::Stopping => "STOPPING",
            ShutdownState::Destroyed => "DESTROYED",
            ShutdownState::SettingsRestored => "SETTINGS_RESTORED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_states_are_ordered() {
        let mut state = ShutdownState::Running;
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            assert!(next > state);
            state = next;
            seen.push(state);
        }
        assert_eq!(seen.len(), 4);
        assert!(state.is_terminal());
    }

    #[test]
    fn blueprint_glob() {
        let filter = BlueprintFilter::default();
        assert!(filter.matches_id("vehicle.tesla.model3"));
        assert!(!filter.matches_id("walker.pedestrian.0001"));

        let exact = BlueprintFilter {
            pattern: "vehicle.audi.tt".into(),
            wheels: None,
        };
        assert!(exact.matches_id("vehicle.audi.tt"));
        assert!(!exact.matches_id("vehicle.audi.a2"));

        let middle = BlueprintFilter {
            pattern: "vehicle.*.model*".into(),
            wheels: Some(4),
        };
        assert!(middle.matches_id("vehicle.tesla.model3"));
        assert!(!middle.matches_id("vehicle.audi.tt"));
    }

    #[test]
    fn synchronous_settings_keep_other_fields() {
        let original = WorldSettings {
            no_rendering_mode: true,
            ..Default::default()
        };
        let sync = original.synchronous(0.05);
        assert!(sync.synchronous_mode);
        assert_eq!(sync.fixed_delta_seconds, Some(0.05));
        assert!(sync.no_rendering_mode);
    }
}
