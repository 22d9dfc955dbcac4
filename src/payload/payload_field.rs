use crate::error::{ValidationError, Violation};
use strum_macros::{Display, EnumCount, EnumIter, EnumString};

/// Editable payload fields.
///
/// Declaration order is the positional order of the `add` command arguments, so
/// iterating the variants walks an `add` argument list front to back.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumCount,
)]
#[strum(serialize_all = "snake_case")]
pub enum PayloadField {
    Index,
    Weight,
    AreaX,
    AreaY,
    DragCoef,
    #[strum(to_string = "altitude", serialize = "alt")]
    Altitude,
    #[strum(to_string = "destination_lat", serialize = "lat")]
    DestinationLat,
    #[strum(to_string = "destination_lon", serialize = "lon")]
    DestinationLon,
    PwmId,
    #[strum(to_string = "pwm_open_freq", serialize = "pwm_open")]
    PwmOpenFreq,
    #[strum(to_string = "pwm_close_freq", serialize = "pwm_close")]
    PwmCloseFreq,
}

/// A parsed and validated field value, tagged by its storage type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Index(u16),
    Scalar(f32),
    Coordinate(f64),
    Channel(u32),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Index(v) => write!(f, "{v}"),
            FieldValue::Scalar(v) => write!(f, "{v}"),
            FieldValue::Coordinate(v) => write!(f, "{v}"),
            FieldValue::Channel(v) => write!(f, "{v}"),
        }
    }
}

/// Validation rule family a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRule {
    Index,
    Positive,
    Latitude,
    Longitude,
    Channel,
}

impl PayloadField {
    const INDEX_MAX: i64 = u16::MAX as i64;
    const CHANNEL_MAX: i64 = u32::MAX as i64;
    const LAT_LIMIT: f64 = 90.0;
    const LON_LIMIT: f64 = 180.0;

    fn rule(self) -> FieldRule {
        match self {
            PayloadField::Index => FieldRule::Index,
            PayloadField::Weight
            | PayloadField::AreaX
            | PayloadField::AreaY
            | PayloadField::DragCoef
            | PayloadField::Altitude => FieldRule::Positive,
            PayloadField::DestinationLat => FieldRule::Latitude,
            PayloadField::DestinationLon => FieldRule::Longitude,
            PayloadField::PwmId | PayloadField::PwmOpenFreq | PayloadField::PwmCloseFreq => {
                FieldRule::Channel
            }
        }
    }

    /// Parses `raw` into this field's type and runs its validation predicate.
    ///
    /// A literal zero and unreadable text are both rejected, but with distinct
    /// [`Violation`]s so the diagnostic tells them apart.
    pub fn parse(self, raw: &str) -> Result<FieldValue, ValidationError> {
        let text = raw.trim();
        let reject = |violation| ValidationError::new(self, raw, violation);
        let value = match self.rule() {
            FieldRule::Index => FieldValue::Index(Self::parse_index(raw)?),
            FieldRule::Channel => {
                let v = Self::parse_integer(text, Self::CHANNEL_MAX).map_err(reject)?;
                FieldValue::Channel(u32::try_from(v).map_err(|_| reject(Violation::Unparsable))?)
            }
            FieldRule::Positive => {
                FieldValue::Scalar(text.parse::<f32>().map_err(|_| reject(Violation::Unparsable))?)
            }
            FieldRule::Latitude | FieldRule::Longitude => FieldValue::Coordinate(
                text.parse::<f64>().map_err(|_| reject(Violation::Unparsable))?,
            ),
        };
        self.check(value).map_err(reject)?;
        Ok(value)
    }

    /// Parses a priority index on its own, as used by commands addressing a payload.
    pub fn parse_index(raw: &str) -> Result<u16, ValidationError> {
        let reject = |violation| ValidationError::new(PayloadField::Index, raw, violation);
        let v = Self::parse_integer(raw.trim(), Self::INDEX_MAX).map_err(reject)?;
        u16::try_from(v).map_err(|_| reject(Violation::Unparsable))
    }

    /// Runs this field's validation predicate on an already typed value.
    pub fn check(self, value: FieldValue) -> Result<(), Violation> {
        match (self.rule(), value) {
            (FieldRule::Index, FieldValue::Index(v)) => {
                if v == 0 { Err(Violation::Zero) } else { Ok(()) }
            }
            (FieldRule::Channel, FieldValue::Channel(v)) => {
                if v == 0 { Err(Violation::Zero) } else { Ok(()) }
            }
            (FieldRule::Positive, FieldValue::Scalar(v)) => {
                if !v.is_finite() {
                    Err(Violation::NotFinite)
                } else if v == 0.0 {
                    Err(Violation::Zero)
                } else if v < 0.0 {
                    Err(Violation::NotPositive)
                } else {
                    Ok(())
                }
            }
            (FieldRule::Latitude, FieldValue::Coordinate(v)) => Self::check_coordinate(v, Self::LAT_LIMIT),
            (FieldRule::Longitude, FieldValue::Coordinate(v)) => Self::check_coordinate(v, Self::LON_LIMIT),
            _ => Err(Violation::Unparsable),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn parse_integer(text: &str, max: i64) -> Result<i64, Violation> {
        let v = text.parse::<i64>().map_err(|_| Violation::Unparsable)?;
        match v {
            0 => Err(Violation::Zero),
            v if v < 0 => Err(Violation::NotPositive),
            v if v > max => Err(Violation::OutOfRange { min: 1.0, max: max as f64 }),
            v => Ok(v),
        }
    }

    fn check_coordinate(v: f64, limit: f64) -> Result<(), Violation> {
        if !v.is_finite() {
            Err(Violation::NotFinite)
        } else if v == 0.0 {
            Err(Violation::Zero)
        } else if v.abs() > limit {
            Err(Violation::OutOfRange { min: -limit, max: limit })
        } else {
            Ok(())
        }
    }
}
