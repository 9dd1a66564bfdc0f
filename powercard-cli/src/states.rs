use std::{
    collections::BTreeMap,
    fs,
    io::{self, Read},
    path::Path,
};

use powercard_history::Watts;
use serde::Deserialize;

use crate::prelude::*;

/// Current entity states, as reported by the host.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "StatesDocument")]
pub struct EntityStates(BTreeMap<String, EntityState>);

/// Accepted layouts: the Home Assistant `/api/states` list, or a plain mapping.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatesDocument {
    List(Vec<ListedState>),
    Map(BTreeMap<String, EntityState>),
}

#[derive(Deserialize)]
struct ListedState {
    entity_id: String,

    #[serde(flatten)]
    state: FullState,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum EntityState {
    Number(f64),
    Text(String),
    Full(FullState),
}

#[derive(Clone, Debug, Deserialize)]
pub struct FullState {
    pub state: String,

    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Attributes {
    pub unit_of_measurement: Option<String>,
}

impl From<StatesDocument> for EntityStates {
    fn from(document: StatesDocument) -> Self {
        match document {
            StatesDocument::List(states) => Self(
                states
                    .into_iter()
                    .map(|listed| (listed.entity_id, EntityState::Full(listed.state)))
                    .collect(),
            ),
            StatesDocument::Map(states) => Self(states),
        }
    }
}

impl EntityStates {
    /// Read the states from a JSON file, or from the standard input when the path is `-`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = if path.as_os_str() == "-" {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("failed to read the standard input")?;
            text
        } else {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?
        };
        let states: Self = serde_json::from_str(&text).context("failed to parse the states")?;
        debug!(n_states = states.0.len(), "loaded");
        Ok(states)
    }

    /// Current power of the entity, if its state is a number.
    #[must_use]
    pub fn power(&self, entity_id: &str) -> Option<Watts> {
        self.0.get(entity_id)?.power()
    }
}

impl EntityState {
    /// Power in watts, `None` for unavailable, unknown or otherwise non-numeric states.
    #[must_use]
    pub fn power(&self) -> Option<Watts> {
        let (value, unit) = match self {
            Self::Number(value) => (*value, None),
            Self::Text(state) => (state.trim().parse::<f64>().ok()?, None),
            Self::Full(full) => (
                full.state.trim().parse::<f64>().ok()?,
                full.attributes.unit_of_measurement.as_deref(),
            ),
        };
        if !value.is_finite() {
            return None;
        }
        match unit {
            Some("kW") => Some(Watts::from_kilowatts(value)),
            _ => Some(Watts::from(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn watts(value: Option<Watts>) -> f64 {
        value.unwrap().into()
    }

    #[test]
    fn test_plain_mapping() {
        let states: EntityStates = serde_json::from_str(
            r#"{
                "sensor.solar_power": "1520.5",
                "sensor.grid_power": -300,
                "sensor.battery_power": {"state": "1.2", "attributes": {"unit_of_measurement": "kW"}},
                "sensor.heat_pump_power": "unavailable",
                "sensor.boiler_power": {"state": "unknown"}
            }"#,
        )
        .unwrap();
        assert_abs_diff_eq!(watts(states.power("sensor.solar_power")), 1520.5);
        assert_abs_diff_eq!(watts(states.power("sensor.grid_power")), -300.0);
        assert_abs_diff_eq!(watts(states.power("sensor.battery_power")), 1200.0, epsilon = 1e-9);
        assert_eq!(states.power("sensor.heat_pump_power"), None);
        assert_eq!(states.power("sensor.boiler_power"), None);
        assert_eq!(states.power("sensor.missing"), None);
    }

    #[test]
    fn test_home_assistant_list() {
        let states: EntityStates = serde_json::from_str(
            r#"[
                {
                    "entity_id": "sensor.main_power",
                    "state": "812",
                    "attributes": {"unit_of_measurement": "W", "friendly_name": "Main"},
                    "last_changed": "2025-06-02T08:50:00+00:00"
                },
                {"entity_id": "sensor.circuit_1_power", "state": "NaN", "attributes": {}}
            ]"#,
        )
        .unwrap();
        assert_abs_diff_eq!(watts(states.power("sensor.main_power")), 812.0);
        assert_eq!(states.power("sensor.circuit_1_power"), None);
    }

    #[test]
    fn test_read_from_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("states.json");
        fs::write(&path, r#"{"sensor.x": "42"}"#).unwrap();
        let states = EntityStates::read_from(&path).unwrap();
        assert_abs_diff_eq!(watts(states.power("sensor.x")), 42.0);
    }
}
