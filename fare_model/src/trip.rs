use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{FareError, Result};

/// Raw attributes of one hypothetical trip, as entered by a user.
///
/// Every field except the two timestamps falls back to the form defaults when
/// omitted from a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripInput {
    pub pickup: NaiveDateTime,
    pub dropoff: NaiveDateTime,

    #[serde(default = "defaults::vendor_id")]
    pub vendor_id: i64,
    #[serde(default = "defaults::passenger_count")]
    pub passenger_count: i64,
    #[serde(default = "defaults::longitude")]
    pub pickup_longitude: f64,
    #[serde(default = "defaults::latitude")]
    pub pickup_latitude: f64,
    #[serde(default = "defaults::longitude")]
    pub dropoff_longitude: f64,
    #[serde(default = "defaults::latitude")]
    pub dropoff_latitude: f64,
    #[serde(default = "defaults::ratecode_id")]
    pub ratecode_id: i64,
    /// "Y" when the trip record was held in vehicle memory; anything else is "N".
    #[serde(default = "defaults::store_and_fwd_flag")]
    pub store_and_fwd_flag: String,
    #[serde(default = "defaults::payment_type")]
    pub payment_type: i64,

    #[serde(default = "defaults::extra")]
    pub extra: f64,
    #[serde(default = "defaults::mta_tax")]
    pub mta_tax: f64,
    #[serde(default)]
    pub tip_amount: f64,
    #[serde(default)]
    pub tolls_amount: f64,
    #[serde(default = "defaults::improvement_surcharge")]
    pub improvement_surcharge: f64,
}

pub mod defaults {
    pub const VENDOR_CHOICES: [i64; 2] = [1, 2];
    pub const RATECODE_CHOICES: [i64; 6] = [1, 2, 3, 4, 5, 6];
    pub const PAYMENT_CHOICES: [i64; 6] = [1, 2, 3, 4, 5, 6];
    pub const FLAG_CHOICES: [&str; 2] = ["N", "Y"];
    pub const MIN_PASSENGERS: i64 = 1;
    pub const MAX_PASSENGERS: i64 = 10;

    pub fn vendor_id() -> i64 {
        1
    }
    pub fn passenger_count() -> i64 {
        1
    }
    pub fn longitude() -> f64 {
        -73.985428
    }
    pub fn latitude() -> f64 {
        40.748817
    }
    pub fn ratecode_id() -> i64 {
        1
    }
    pub fn store_and_fwd_flag() -> String {
        "N".to_string()
    }
    pub fn payment_type() -> i64 {
        1
    }
    pub fn extra() -> f64 {
        0.5
    }
    pub fn mta_tax() -> f64 {
        0.5
    }
    pub fn improvement_surcharge() -> f64 {
        0.3
    }
}

impl TripInput {
    /// A trip between the given times with every other attribute at its default.
    pub fn new(pickup: NaiveDateTime, dropoff: NaiveDateTime) -> Self {
        Self {
            pickup,
            dropoff,
            vendor_id: defaults::vendor_id(),
            passenger_count: defaults::passenger_count(),
            pickup_longitude: defaults::longitude(),
            pickup_latitude: defaults::latitude(),
            dropoff_longitude: defaults::longitude(),
            dropoff_latitude: defaults::latitude(),
            ratecode_id: defaults::ratecode_id(),
            store_and_fwd_flag: defaults::store_and_fwd_flag(),
            payment_type: defaults::payment_type(),
            extra: defaults::extra(),
            mta_tax: defaults::mta_tax(),
            tip_amount: 0.0,
            tolls_amount: 0.0,
            improvement_surcharge: defaults::improvement_surcharge(),
        }
    }

    /// The default 09:00 to 09:30 trip on `date`.
    pub fn default_on(date: NaiveDate) -> Self {
        let pickup = date.and_hms_opt(9, 0, 0).unwrap_or_default();
        let dropoff = date.and_hms_opt(9, 30, 0).unwrap_or_default();
        Self::new(pickup, dropoff)
    }

    /// Rejects a trip whose dropoff is not strictly after pickup, or whose
    /// numeric attributes are not finite.
    pub fn validate(&self) -> Result<()> {
        if self.dropoff <= self.pickup {
            return Err(FareError::InvalidTripTimes {
                pickup: self.pickup,
                dropoff: self.dropoff,
            });
        }
        let numeric = [
            ("pickup_longitude", self.pickup_longitude),
            ("pickup_latitude", self.pickup_latitude),
            ("dropoff_longitude", self.dropoff_longitude),
            ("dropoff_latitude", self.dropoff_latitude),
            ("extra", self.extra),
            ("mta_tax", self.mta_tax),
            ("tip_amount", self.tip_amount),
            ("tolls_amount", self.tolls_amount),
            ("improvement_surcharge", self.improvement_surcharge),
        ];
        if let Some((name, _)) = numeric.iter().find(|(_, v)| !v.is_finite()) {
            return Err(FareError::InvalidInput(format!("{name} must be a finite number")));
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> f64 {
        (self.dropoff - self.pickup).num_milliseconds() as f64 / 60_000.0
    }

    pub fn hour(&self) -> u32 {
        self.pickup.hour()
    }

    /// Monday = 0 through Sunday = 6.
    pub fn day_of_week(&self) -> u32 {
        self.pickup.weekday().num_days_from_monday()
    }

    pub fn store_and_fwd_encoded(&self) -> f64 {
        if self.store_and_fwd_flag == "Y" {
            1.0
        } else {
            0.0
        }
    }

    /// Sum of the charges added on top of the base fare.
    pub fn surcharges(&self) -> f64 {
        self.extra + self.mta_tax + self.tip_amount + self.tolls_amount + self.improvement_surcharge
    }
}
