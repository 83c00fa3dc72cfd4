//! Reference-range classification of validated observations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::enums::RangeStatus;
use crate::models::{ClassifiedTest, TestObservation};

/// What happens to one observation.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Classified(ClassifiedTest),
    /// Lower or upper bound absent: never persisted, never counted.
    MissingBounds,
    /// Bounds present but the value has no numeric reading (e.g. "Positive").
    NonNumeric,
}

/// Inclusive at both ends.
pub fn is_in_range(value: f64, minlimit: f64, maxlimit: f64) -> bool {
    minlimit <= value && value <= maxlimit
}

/// Classify one observation for `patient_id`.
///
/// `now` is shared by every observation of a report and fills both the
/// observation and creation timestamps.
pub fn classify_observation(
    observation: &TestObservation,
    patient_id: i64,
    now: DateTime<Utc>,
) -> Disposition {
    let Some((minlimit, maxlimit)) = observation.bounds() else {
        return Disposition::MissingBounds;
    };

    let Some(value) = observation.value.as_ref().and_then(|v| v.as_number()) else {
        return Disposition::NonNumeric;
    };

    Disposition::Classified(ClassifiedTest {
        patient_id,
        test_type: observation.test_type.clone(),
        value,
        minlimit,
        maxlimit,
        unit: observation.unit.clone(),
        test_timestamp: now,
        status: RangeStatus::from_in_range(is_in_range(value, minlimit, maxlimit)),
        created_at: now,
    })
}

/// In-range and out-of-range results of one report, in observation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultLists {
    pub in_range: Vec<ClassifiedTest>,
    pub out_of_range: Vec<ClassifiedTest>,
}

impl ResultLists {
    pub fn push(&mut self, test: ClassifiedTest) {
        if test.is_in_range() {
            self.in_range.push(test);
        } else {
            self.out_of_range.push(test);
        }
    }

    pub fn len(&self) -> usize {
        self.in_range.len() + self.out_of_range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
