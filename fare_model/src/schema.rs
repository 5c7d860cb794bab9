//! Static description of the columns a fitted model can consume.
//!
//! The persisted schema is a plain list of column names. Loading it resolves
//! every name into a [`FeatureSource`], so the predictor knows up front how to
//! fill each slot from a [`TripInput`]. Names that map to nothing are rejected
//! here rather than silently zero-filled at prediction time.

use std::collections::HashSet;

use crate::error::{FareError, Result};
use crate::trip::TripInput;

/// Numeric fields taken directly (or derived) from one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseField {
    VendorId,
    PassengerCount,
    PickupLongitude,
    PickupLatitude,
    DropoffLongitude,
    DropoffLatitude,
    StoreAndFwdFlag,
    Extra,
    MtaTax,
    TipAmount,
    TollsAmount,
    ImprovementSurcharge,
    DurationMinutes,
    Hour,
    DayOfWeek,
}

impl BaseField {
    /// Row assembly order.
    pub const ALL: [BaseField; 15] = [
        BaseField::VendorId,
        BaseField::PassengerCount,
        BaseField::PickupLongitude,
        BaseField::PickupLatitude,
        BaseField::DropoffLongitude,
        BaseField::DropoffLatitude,
        BaseField::StoreAndFwdFlag,
        BaseField::Extra,
        BaseField::MtaTax,
        BaseField::TipAmount,
        BaseField::TollsAmount,
        BaseField::ImprovementSurcharge,
        BaseField::DurationMinutes,
        BaseField::Hour,
        BaseField::DayOfWeek,
    ];

    pub fn column(self) -> &'static str {
        match self {
            BaseField::VendorId => "VendorID",
            BaseField::PassengerCount => "passenger_count",
            BaseField::PickupLongitude => "pickup_longitude",
            BaseField::PickupLatitude => "pickup_latitude",
            BaseField::DropoffLongitude => "dropoff_longitude",
            BaseField::DropoffLatitude => "dropoff_latitude",
            BaseField::StoreAndFwdFlag => "store_and_fwd_flag",
            BaseField::Extra => "extra",
            BaseField::MtaTax => "mta_tax",
            BaseField::TipAmount => "tip_amount",
            BaseField::TollsAmount => "tolls_amount",
            BaseField::ImprovementSurcharge => "improvement_surcharge",
            BaseField::DurationMinutes => "duration_minutes",
            BaseField::Hour => "hour",
            BaseField::DayOfWeek => "day_of_week",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }

    /// Caller must have validated the trip; duration is not re-checked here.
    pub fn value(self, trip: &TripInput) -> f64 {
        match self {
            BaseField::VendorId => trip.vendor_id as f64,
            BaseField::PassengerCount => trip.passenger_count as f64,
            BaseField::PickupLongitude => trip.pickup_longitude,
            BaseField::PickupLatitude => trip.pickup_latitude,
            BaseField::DropoffLongitude => trip.dropoff_longitude,
            BaseField::DropoffLatitude => trip.dropoff_latitude,
            BaseField::StoreAndFwdFlag => trip.store_and_fwd_encoded(),
            BaseField::Extra => trip.extra,
            BaseField::MtaTax => trip.mta_tax,
            BaseField::TipAmount => trip.tip_amount,
            BaseField::TollsAmount => trip.tolls_amount,
            BaseField::ImprovementSurcharge => trip.improvement_surcharge,
            BaseField::DurationMinutes => trip.duration_minutes(),
            BaseField::Hour => trip.hour() as f64,
            BaseField::DayOfWeek => trip.day_of_week() as f64,
        }
    }
}

/// Integer-coded fields expanded into one binary column per observed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    RateCode,
    PaymentType,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 2] = [CategoricalField::RateCode, CategoricalField::PaymentType];

    pub fn prefix(self) -> &'static str {
        match self {
            CategoricalField::RateCode => "RatecodeID",
            CategoricalField::PaymentType => "payment_type",
        }
    }

    /// Expansion column for one code, `<prefix>_<code>`.
    pub fn column_name(self, code: i64) -> String {
        format!("{}_{}", self.prefix(), code)
    }

    pub fn code(self, trip: &TripInput) -> i64 {
        match self {
            CategoricalField::RateCode => trip.ratecode_id,
            CategoricalField::PaymentType => trip.payment_type,
        }
    }

    /// Inverse of [`column_name`](Self::column_name). Only the canonical
    /// spelling is accepted, so `RatecodeID_01` or `RatecodeID_1.0` do not
    /// resolve.
    pub fn parse_column(name: &str) -> Option<(Self, i64)> {
        Self::ALL.into_iter().find_map(|field| {
            let suffix = name.strip_prefix(field.prefix())?.strip_prefix('_')?;
            let code: i64 = suffix.parse().ok()?;
            (field.column_name(code) == name).then_some((field, code))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureSource {
    Base(BaseField),
    OneHot { field: CategoricalField, code: i64 },
}

impl FeatureSource {
    pub fn resolve(name: &str) -> Option<Self> {
        if let Some(field) = BaseField::from_column(name) {
            return Some(FeatureSource::Base(field));
        }
        CategoricalField::parse_column(name).map(|(field, code)| FeatureSource::OneHot { field, code })
    }

    pub fn value(self, trip: &TripInput) -> f64 {
        match self {
            FeatureSource::Base(field) => field.value(trip),
            FeatureSource::OneHot { field, code } => {
                if field.code(trip) == code {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Ordered, resolved feature schema. The order is the one the scaler and the
/// model were fitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayout {
    columns: Vec<String>,
    sources: Vec<FeatureSource>,
}

impl FeatureLayout {
    pub fn resolve(columns: &[String]) -> Result<Self> {
        if columns.is_empty() {
            return Err(FareError::SchemaMismatch("schema has no columns".into()));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        let mut sources = Vec::with_capacity(columns.len());
        let mut unknown = Vec::new();
        for name in columns {
            if !seen.insert(name.as_str()) {
                return Err(FareError::SchemaMismatch(format!("column `{name}` appears more than once")));
            }
            match FeatureSource::resolve(name) {
                Some(src) => sources.push(src),
                None => unknown.push(name.as_str()),
            }
        }
        if !unknown.is_empty() {
            return Err(FareError::SchemaMismatch(format!(
                "columns not derivable from trip input: {}",
                unknown.join(", ")
            )));
        }

        Ok(Self {
            columns: columns.to_vec(),
            sources,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn sources(&self) -> &[FeatureSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn base_columns_round_trip() {
        for field in BaseField::ALL {
            assert_eq!(BaseField::from_column(field.column()), Some(field));
        }
    }

    #[test]
    fn one_hot_names_are_canonical() {
        assert_eq!(CategoricalField::RateCode.column_name(5), "RatecodeID_5");
        assert_eq!(
            CategoricalField::parse_column("payment_type_2"),
            Some((CategoricalField::PaymentType, 2))
        );
        assert_eq!(CategoricalField::parse_column("RatecodeID_1.0"), None);
        assert_eq!(CategoricalField::parse_column("RatecodeID_01"), None);
        assert_eq!(CategoricalField::parse_column("RatecodeID"), None);
    }

    #[test]
    fn resolves_mixed_schema_in_order() {
        let layout = FeatureLayout::resolve(&names(&["hour", "RatecodeID_2", "extra"])).unwrap();
        assert_eq!(
            layout.sources(),
            &[
                FeatureSource::Base(BaseField::Hour),
                FeatureSource::OneHot {
                    field: CategoricalField::RateCode,
                    code: 2
                },
                FeatureSource::Base(BaseField::Extra),
            ]
        );
    }

    #[test]
    fn rejects_unknown_and_duplicate_columns() {
        let err = FeatureLayout::resolve(&names(&["hour", "trip_distance"])).unwrap_err();
        assert!(err.to_string().contains("trip_distance"));

        let err = FeatureLayout::resolve(&names(&["hour", "hour"])).unwrap_err();
        assert!(matches!(err, FareError::SchemaMismatch(_)));

        assert!(FeatureLayout::resolve(&[]).is_err());
    }
}
