//! Car service histories.

use serde::{Deserialize, Deserializer, Serialize};

use crate::codec::{Entity, EntityKind};

/// A car and its ordered service records.
///
/// ## Invariants
/// - `records` only grows; entries keep their position once appended.
/// - `car_id` matches the ledger key the car was registered under.
///
/// # Example
///
/// ```
/// use record_ledger::Car;
///
/// let mut car = Car::register("car1");
/// car.append_record("oil change");
/// car.append_record("tire rotation");
///
/// assert_eq!(car.car_id(), "car1");
/// assert_eq!(car.records(), ["oil change", "tire rotation"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Car {
    car_id: String,
    #[serde(deserialize_with = "records_or_empty")]
    records: Vec<String>,
}

impl Car {
    /// Build a car with no service records.
    #[must_use]
    pub fn register(car_id: impl Into<String>) -> Self {
        Self {
            car_id: car_id.into(),
            records: Vec::new(),
        }
    }

    /// Identifier stored alongside the records.
    #[must_use]
    pub fn car_id(&self) -> &str {
        self.car_id.as_str()
    }

    /// Service records in the order they were appended.
    #[must_use]
    pub fn records(&self) -> &[String] {
        &self.records
    }

    /// Append a service record after every existing entry.
    pub fn append_record(&mut self, record: impl Into<String>) {
        self.records.push(record.into());
    }
}

impl Entity for Car {
    const KIND: EntityKind = EntityKind::Car;
}

// Other ledger clients may write a nil list as `null`.
fn records_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
