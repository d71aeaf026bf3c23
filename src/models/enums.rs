use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors raised when converting wire/form strings into model enums.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// Serde uses the same strings, so the form and the JSON views speak the
/// labels shown to the user.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

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
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

str_enum!(SymptomDuration {
    LessThanOneDay => "Less than 1 day",
    OneToThreeDays => "1-3 days",
    FourToSevenDays => "4-7 days",
    OneToTwoWeeks => "1-2 weeks",
    TwoToFourWeeks => "2-4 weeks",
    MoreThanOneMonth => "More than 1 month",
});

// Values double as the OpenStreetMap `amenity` tag.
str_enum!(FacilityCategory {
    Hospital => "hospital",
    Pharmacy => "pharmacy",
});

impl FacilityCategory {
    /// Human label, also used when a facility carries no name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hospital => "Hospital",
            Self::Pharmacy => "Pharmacy",
        }
    }
}
