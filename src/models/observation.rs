use serde::{Deserialize, Serialize};

/// Raw `value` field of an observation as the model emitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Number(f64),
    Text(String),
}

impl ObservationValue {
    /// Numeric reading of the value. Text is accepted only when the whole
    /// trimmed string parses as a finite number ("14.9" yes, "Positive" no).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl std::fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One test result extracted by the language model, after schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestObservation {
    pub test_type: String,
    pub value: Option<ObservationValue>,
    pub unit: Option<String>,
    pub minlimit: Option<f64>,
    pub maxlimit: Option<f64>,
    pub timestamp: Option<String>,
}

impl TestObservation {
    /// Both reference bounds, when present.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.minlimit?, self.maxlimit?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_parses() {
        let v = ObservationValue::Text(" 14.9 ".into());
        assert_eq!(v.as_number(), Some(14.9));
    }

    #[test]
    fn qualitative_text_is_not_numeric() {
        assert_eq!(ObservationValue::Text("Positive".into()).as_number(), None);
        assert_eq!(ObservationValue::Text("14.9 g/dL".into()).as_number(), None);
        assert_eq!(ObservationValue::Text("NaN".into()).as_number(), None);
    }

    #[test]
    fn bounds_require_both_limits() {
        let mut obs = TestObservation {
            test_type: "Glucose".into(),
            value: Some(ObservationValue::Number(90.0)),
            unit: Some("mg/dL".into()),
            minlimit: Some(70.0),
            maxlimit: None,
            timestamp: None,
        };
        assert!(obs.bounds().is_none());

        obs.maxlimit = Some(110.0);
        assert_eq!(obs.bounds(), Some((70.0, 110.0)));
    }

    #[test]
    fn untagged_value_deserializes_number_and_text() {
        let n: ObservationValue = serde_json::from_str("12.5").unwrap();
        let t: ObservationValue = serde_json::from_str("\"Negative\"").unwrap();
        assert_eq!(n, ObservationValue::Number(12.5));
        assert_eq!(t, ObservationValue::Text("Negative".into()));
    }
}
