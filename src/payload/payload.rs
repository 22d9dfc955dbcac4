use super::payload_field::{FieldValue, PayloadField};
use crate::error::{ValidationError, Violation};
use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};

/// Drag-relevant properties of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Aerodynamics {
    /// Mass in kg.
    pub weight: f32,
    /// Cross-section along x in m².
    pub area_x: f32,
    /// Cross-section along y in m².
    pub area_y: f32,
    pub drag_coef: f32,
}

/// Where the payload is released and where it should land.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DropTarget {
    /// Release altitude in m.
    pub altitude: f32,
    /// WGS84 latitude in degrees.
    pub lat: f64,
    /// WGS84 longitude in degrees.
    pub lon: f64,
}

/// Servo channel and the signal frequencies that open and close the latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActuatorBinding {
    pub pwm_id: u32,
    pub open_freq: u32,
    pub close_freq: u32,
}

/// One droppable item. `index` is both its identity and its release priority.
///
/// A `Payload` can only be obtained through [`Payload::from_args`], which
/// validates every field, and is only changed through the same per-field
/// checks, so any value of this type satisfies the field constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    index: u16,
    aero: Aerodynamics,
    target: DropTarget,
    actuator: ActuatorBinding,
}

impl Payload {
    /// Number of positional arguments describing a payload.
    pub const ARG_COUNT: usize = PayloadField::COUNT;

    /// Builds a payload from the positional argument list
    /// `index weight area_x area_y drag_coef altitude lat lon pwm_id pwm_open pwm_close`.
    ///
    /// Extra arguments are ignored, missing ones are reported against the first
    /// absent field.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ValidationError> {
        let mut draft = Self {
            index: 0,
            aero: Aerodynamics::default(),
            target: DropTarget::default(),
            actuator: ActuatorBinding::default(),
        };
        let mut fields = PayloadField::iter();
        for (raw, field) in args.iter().zip(fields.by_ref()) {
            draft.set(field, field.parse(raw.as_ref())?)?;
        }
        if let Some(missing) = fields.next() {
            return Err(ValidationError::new(missing, "", Violation::Unparsable));
        }
        Ok(draft)
    }

    pub fn index(&self) -> u16 { self.index }
    #[cfg(test)]
    pub fn aero(&self) -> &Aerodynamics { &self.aero }
    #[cfg(test)]
    pub fn target(&self) -> &DropTarget { &self.target }
    pub fn actuator(&self) -> &ActuatorBinding { &self.actuator }

    /// Reads a single field as its tagged value.
    pub fn get(&self, field: PayloadField) -> FieldValue {
        match field {
            PayloadField::Index => FieldValue::Index(self.index),
            PayloadField::Weight => FieldValue::Scalar(self.aero.weight),
            PayloadField::AreaX => FieldValue::Scalar(self.aero.area_x),
            PayloadField::AreaY => FieldValue::Scalar(self.aero.area_y),
            PayloadField::DragCoef => FieldValue::Scalar(self.aero.drag_coef),
            PayloadField::Altitude => FieldValue::Scalar(self.target.altitude),
            PayloadField::DestinationLat => FieldValue::Coordinate(self.target.lat),
            PayloadField::DestinationLon => FieldValue::Coordinate(self.target.lon),
            PayloadField::PwmId => FieldValue::Channel(self.actuator.pwm_id),
            PayloadField::PwmOpenFreq => FieldValue::Channel(self.actuator.open_freq),
            PayloadField::PwmCloseFreq => FieldValue::Channel(self.actuator.close_freq),
        }
    }

    /// Overwrites a single field. The value is checked against the field's
    /// predicate first and the payload stays untouched on failure.
    pub(super) fn set(&mut self, field: PayloadField, value: FieldValue) -> Result<(), ValidationError> {
        field.check(value).map_err(|v| ValidationError::new(field, value.to_string(), v))?;
        match (field, value) {
            (PayloadField::Index, FieldValue::Index(v)) => self.index = v,
            (PayloadField::Weight, FieldValue::Scalar(v)) => self.aero.weight = v,
            (PayloadField::AreaX, FieldValue::Scalar(v)) => self.aero.area_x = v,
            (PayloadField::AreaY, FieldValue::Scalar(v)) => self.aero.area_y = v,
            (PayloadField::DragCoef, FieldValue::Scalar(v)) => self.aero.drag_coef = v,
            (PayloadField::Altitude, FieldValue::Scalar(v)) => self.target.altitude = v,
            (PayloadField::DestinationLat, FieldValue::Coordinate(v)) => self.target.lat = v,
            (PayloadField::DestinationLon, FieldValue::Coordinate(v)) => self.target.lon = v,
            (PayloadField::PwmId, FieldValue::Channel(v)) => self.actuator.pwm_id = v,
            (PayloadField::PwmOpenFreq, FieldValue::Channel(v)) => self.actuator.open_freq = v,
            (PayloadField::PwmCloseFreq, FieldValue::Channel(v)) => self.actuator.close_freq = v,
            _ => {
                return Err(ValidationError::new(field, value.to_string(), Violation::Unparsable));
            }
        }
        Ok(())
    }
}

/// Read-only copy of a payload handed to the mission generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadDescriptor {
    pub index: u16,
    pub aero: Aerodynamics,
    pub target: DropTarget,
    pub actuator: ActuatorBinding,
}

impl From<&Payload> for PayloadDescriptor {
    fn from(value: &Payload) -> Self {
        Self { index: value.index, aero: value.aero, target: value.target, actuator: value.actuator }
    }
}
