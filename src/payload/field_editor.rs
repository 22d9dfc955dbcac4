use super::{
    payload_field::{FieldValue, PayloadField},
    payload_registry::PayloadRegistry,
};
use crate::error::DeployerError;
use std::str::FromStr;

/// Record of a committed single-field edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldEdit {
    /// Index of the payload after the edit.
    pub index: u16,
    pub field: PayloadField,
    pub previous: FieldValue,
    pub current: FieldValue,
}

impl PayloadRegistry {
    /// Replaces one field of the payload stored under `index`.
    ///
    /// The steps run strictly in order: locate the payload, resolve the field
    /// name, parse and validate the raw value, check index uniqueness, commit.
    /// Nothing is written unless every step succeeds.
    ///
    /// # Errors
    /// * [`DeployerError::NotFound`] if no payload has `index`.
    /// * [`DeployerError::UnknownField`] if `field_name` names no payload field.
    /// * [`DeployerError::Validation`] if `raw` fails to parse or is out of range.
    /// * [`DeployerError::DuplicateIndex`] if the new index belongs to another payload.
    pub fn edit(
        &mut self,
        index: u16,
        field_name: &str,
        raw: &str,
    ) -> Result<FieldEdit, DeployerError> {
        self.find(index)?;
        let field = PayloadField::from_str(field_name.trim())
            .map_err(|_| DeployerError::UnknownField(field_name.to_string()))?;
        let value = field.parse(raw)?;

        match (field, value) {
            (PayloadField::Index, FieldValue::Index(new_index)) => {
                self.edit_index(index, new_index)
            }
            _ => {
                let payload = self.find_mut(index)?;
                let previous = payload.get(field);
                payload.set(field, value)?;
                Ok(FieldEdit { index, field, previous, current: value })
            }
        }
    }

    /// Moves a payload to a new priority index. The candidate is checked against
    /// every other payload before anything changes, re-setting the current index
    /// is accepted as a no-op.
    fn edit_index(&mut self, index: u16, new_index: u16) -> Result<FieldEdit, DeployerError> {
        let edit = FieldEdit {
            index: new_index,
            field: PayloadField::Index,
            previous: FieldValue::Index(index),
            current: FieldValue::Index(new_index),
        };
        if new_index == index {
            return Ok(edit);
        }
        if self.contains(new_index) {
            return Err(DeployerError::DuplicateIndex(new_index));
        }
        self.find_mut(index)?.set(PayloadField::Index, edit.current)?;
        self.rekey(index, new_index);
        Ok(edit)
    }
}
