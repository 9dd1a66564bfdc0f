use chrono::{DateTime, Local};
use powercard_quantities::Watts;

/// Single power reading of an entity.
#[derive(Clone, Debug, PartialEq, Eq, bon::Builder)]
#[must_use]
pub struct Sample {
    #[builder(into)]
    pub entity_id: String,

    #[builder(into)]
    pub value: Watts,

    /// When the reading was taken, defaults to the store's clock.
    pub timestamp: Option<DateTime<Local>>,
}

impl Sample {
    /// Samples with an empty entity ID or a non-finite value carry no data.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.entity_id.is_empty() && self.value.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let sample = Sample::builder().entity_id("sensor.x").value(500.0).build();
        assert_eq!(sample.entity_id, "sensor.x");
        assert_eq!(sample.value, Watts::from(500));
        assert!(sample.timestamp.is_none());
        assert!(sample.is_valid());
    }

    #[test]
    fn test_invalid() {
        assert!(!Sample::builder().entity_id("").value(1.0).build().is_valid());
        assert!(!Sample::builder().entity_id("sensor.z").value(f64::NAN).build().is_valid());
        assert!(!Sample::builder().entity_id("sensor.z").value(f64::INFINITY).build().is_valid());
    }
}
