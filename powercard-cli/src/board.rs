use std::{fs, iter, path::Path};

use itertools::Itertools;
use serde::Deserialize;

use crate::prelude::*;

/// Distribution board layout.
///
/// Keys which only matter for rendering (`theme`, `entity_current`, `icon` and so on)
/// are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct Board {
    #[serde(default = "Board::default_title")]
    pub title: String,

    #[serde(default = "enabled")]
    pub show_solar: bool,

    #[serde(default = "enabled")]
    pub show_grid: bool,

    pub solar: Option<Source>,

    pub grid: Option<Source>,

    pub battery: Option<Source>,

    pub main_breaker: Option<Breaker>,

    #[serde(default)]
    pub circuit_breakers: Vec<Breaker>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Source {
    pub entity: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Breaker {
    pub name: Option<String>,
    pub entity_power: Option<String>,

    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Device {
    pub name: Option<String>,
    pub entity: Option<String>,
}

/// Power sensor tracked by the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerEntity<'a> {
    pub name: String,
    pub entity_id: &'a str,
}

const fn enabled() -> bool {
    true
}

impl Board {
    fn default_title() -> String {
        "Distribution Board".to_owned()
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let board: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        info!(title = board.title, n_circuit_breakers = board.circuit_breakers.len(), "loaded");
        Ok(board)
    }

    /// Every configured power sensor, in board order, without duplicates.
    pub fn power_entities(&self) -> Vec<PowerEntity<'_>> {
        let sources = [
            (self.show_solar, &self.solar, "Solar"),
            (self.show_grid, &self.grid, "Grid"),
            (true, &self.battery, "Battery"),
        ]
        .into_iter()
        .filter(|(is_shown, _, _)| *is_shown)
        .filter_map(|(_, source, default_name)| {
            let source = source.as_ref()?;
            Some((source.name.clone().unwrap_or_else(|| default_name.to_owned()), &source.entity))
        });

        let main_breaker = self.main_breaker.iter().map(|breaker| {
            (breaker.name.clone().unwrap_or_else(|| "Main CB".to_owned()), &breaker.entity_power)
        });

        let circuit_breakers =
            self.circuit_breakers.iter().enumerate().flat_map(|(index, breaker)| {
                let breaker_name = breaker.display_name(index);
                let devices = breaker.devices.iter().map(move |device| {
                    let device_name = device.name.as_deref().unwrap_or("Device");
                    (format!("{breaker_name} / {device_name}"), &device.entity)
                });
                iter::once((breaker.display_name(index), &breaker.entity_power)).chain(devices)
            });

        sources
            .chain(main_breaker)
            .chain(circuit_breakers)
            .filter_map(|(name, entity_id)| {
                let entity_id = entity_id.as_deref().filter(|entity_id| !entity_id.is_empty())?;
                Some(PowerEntity { name, entity_id })
            })
            .unique_by(|entity| entity.entity_id)
            .collect()
    }
}

impl Breaker {
    /// Configured name, or `CB-<n>` counting from one.
    #[must_use]
    pub fn display_name(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("CB-{}", index + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"
        title = "Garage"
        theme = "dark"
        animation_speed = 2

        [solar]
        entity = "sensor.solar_power"

        [grid]
        entity = "sensor.grid_power"
        name = "Utility"

        [main_breaker]
        entity_power = "sensor.main_power"
        entity_energy = "sensor.main_energy_daily"

        [[circuit_breakers]]
        entity_power = "sensor.circuit_1_power"

        [[circuit_breakers.devices]]
        name = "Heat pump"
        entity = "sensor.heat_pump_power"
        entity_daily = "sensor.heat_pump_energy_daily"

        [[circuit_breakers.devices]]
        entity = "sensor.main_power"

        [[circuit_breakers]]
        name = "Kitchen"
        entity_power = ""
    "#;

    #[test]
    fn test_parse() {
        let board: Board = toml::from_str(BOARD).unwrap();
        assert_eq!(board.title, "Garage");
        assert!(board.show_solar);
        assert!(board.battery.is_none());
        assert_eq!(board.circuit_breakers.len(), 2);
        assert_eq!(board.circuit_breakers[0].devices.len(), 2);
    }

    #[test]
    fn test_defaults() {
        let board: Board = toml::from_str("").unwrap();
        assert_eq!(board.title, "Distribution Board");
        assert!(board.show_grid);
        assert!(board.power_entities().is_empty());
    }

    #[test]
    fn test_power_entities() {
        let board: Board = toml::from_str(BOARD).unwrap();
        assert_eq!(
            board.power_entities(),
            [
                PowerEntity { name: "Solar".to_owned(), entity_id: "sensor.solar_power" },
                PowerEntity { name: "Utility".to_owned(), entity_id: "sensor.grid_power" },
                PowerEntity { name: "Main CB".to_owned(), entity_id: "sensor.main_power" },
                PowerEntity { name: "CB-1".to_owned(), entity_id: "sensor.circuit_1_power" },
                PowerEntity {
                    name: "CB-1 / Heat pump".to_owned(),
                    entity_id: "sensor.heat_pump_power",
                },
            ]
        );
    }

    #[test]
    fn test_hidden_source() {
        let board: Board = toml::from_str(
            r#"
                show_solar = false
                solar = { entity = "sensor.solar_power" }
                battery = { entity = "sensor.battery_power" }
            "#,
        )
        .unwrap();
        let entities = board.power_entities();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_id, "sensor.battery_power");
        assert_eq!(entities[0].name, "Battery");
    }
}
