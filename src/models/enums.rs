use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(RangeStatus {
    Normal => "normal",
    Abnormal => "abnormal",
});

impl RangeStatus {
    pub fn from_in_range(in_range: bool) -> Self {
        if in_range {
            Self::Normal
        } else {
            Self::Abnormal
        }
    }

    /// Column encoding used by `report_test.status`: 1 = normal, 0 = abnormal.
    pub fn as_flag(&self) -> i32 {
        match self {
            Self::Normal => 1,
            Self::Abnormal => 0,
        }
    }

    pub fn from_flag(flag: i32) -> Result<Self, DatabaseError> {
        match flag {
            1 => Ok(Self::Normal),
            0 => Ok(Self::Abnormal),
            other => Err(DatabaseError::InvalidEnum {
                field: "RangeStatus".into(),
                value: other.to_string(),
            }),
        }
    }

    /// Label shown to the patient in the summary email.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Abnormal => "Abnormal",
        }
    }
}

// Failure classification attached to every record that does not finish cleanly.
str_enum!(ErrorKind {
    MalformedRecord => "malformed_record",
    FetchFailure => "fetch_failure",
    ExtractionFailure => "extraction_failure",
    ModelCallFailure => "model_call_failure",
    ModelResponseFormat => "model_response_format",
    KeyFormat => "key_format",
    PersistenceFailure => "persistence_failure",
    PatientNotFound => "patient_not_found",
    NotificationFailure => "notification_failure",
});
