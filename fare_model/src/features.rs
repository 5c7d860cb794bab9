//! Rebuilds the training-time feature vector from a single trip.

use crate::error::Result;
use crate::schema::{BaseField, CategoricalField, FeatureLayout};
use crate::trip::TripInput;

/// One-row table as the trip itself would expand it: every base field, then
/// one indicator column per categorical field for the code actually present.
pub fn expanded_row(trip: &TripInput) -> Vec<(String, f64)> {
    let mut row: Vec<(String, f64)> = BaseField::ALL
        .iter()
        .map(|f| (f.column().to_string(), f.value(trip)))
        .collect();
    for field in CategoricalField::ALL {
        row.push((field.column_name(field.code(trip)), 1.0));
    }
    row
}

/// Maps a trip onto `layout`, in layout order.
///
/// Expansion columns for codes the trip does not carry are 0, including every
/// column of a field whose code was never seen in training. Trip columns the
/// layout does not name are dropped.
pub fn reconstruct(trip: &TripInput, layout: &FeatureLayout) -> Result<Vec<f64>> {
    trip.validate()?;
    Ok(layout.sources().iter().map(|src| src.value(trip)).collect())
}
