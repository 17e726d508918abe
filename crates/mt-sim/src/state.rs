//! Named scalar state slots.
//!
//! Each actuator registers its slots once and keeps the returned
//! [`SlotId`]s. Values and derivatives live in two parallel vectors so the
//! whole store can be handed to an integrator as one `DVector`.

use crate::error::{SimError, SimResult};
use mt_core::SlotId;
use nalgebra::DVector;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct StateStore {
    names: Vec<String>,
    lookup: HashMap<String, SlotId>,
    values: DVector<f64>,
    derivatives: DVector<f64>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            lookup: HashMap::new(),
            values: DVector::zeros(0),
            derivatives: DVector::zeros(0),
        }
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot with an initial value. Names must be unique.
    pub fn add_slot(&mut self, name: impl Into<String>, initial: f64) -> SimResult<SlotId> {
        let name = name.into();
        if self.lookup.contains_key(&name) {
            return Err(SimError::InvalidArg {
                what: "state slot name already registered",
            });
        }
        let index = u32::try_from(self.names.len()).map_err(|_| SimError::InvalidArg {
            what: "too many state slots",
        })?;
        let id = SlotId::from_index(index);

        self.values = grown(&self.values, initial);
        self.derivatives = grown(&self.derivatives, 0.0);
        self.lookup.insert(name.clone(), id);
        self.names.push(name);
        Ok(id)
    }

    pub fn slot(&self, name: &str) -> SimResult<SlotId> {
        self.lookup
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownSlot {
                name: name.to_string(),
            })
    }

    pub fn name(&self, slot: SlotId) -> Option<&str> {
        self.names.get(slot.as_usize()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn check(&self, slot: SlotId) -> SimResult<usize> {
        let i = slot.as_usize();
        if i < self.names.len() {
            Ok(i)
        } else {
            Err(SimError::UnknownSlot {
                name: format!("#{slot}"),
            })
        }
    }

    pub fn value(&self, slot: SlotId) -> SimResult<f64> {
        Ok(self.values[self.check(slot)?])
    }

    pub fn set_value(&mut self, slot: SlotId, value: f64) -> SimResult<()> {
        let i = self.check(slot)?;
        self.values[i] = value;
        Ok(())
    }

    pub fn derivative(&self, slot: SlotId) -> SimResult<f64> {
        Ok(self.derivatives[self.check(slot)?])
    }

    pub fn set_derivative(&mut self, slot: SlotId, value: f64) -> SimResult<()> {
        let i = self.check(slot)?;
        self.derivatives[i] = value;
        Ok(())
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn derivatives(&self) -> &DVector<f64> {
        &self.derivatives
    }

    /// Overwrite every value at once, e.g. with an integrator stage.
    pub fn set_values(&mut self, values: &DVector<f64>) -> SimResult<()> {
        if values.len() != self.values.len() {
            return Err(SimError::InvalidArg {
                what: "state vector length does not match slot count",
            });
        }
        self.values.copy_from(values);
        Ok(())
    }

    pub fn set_derivatives(&mut self, derivatives: &DVector<f64>) -> SimResult<()> {
        if derivatives.len() != self.derivatives.len() {
            return Err(SimError::InvalidArg {
                what: "derivative vector length does not match slot count",
            });
        }
        self.derivatives.copy_from(derivatives);
        Ok(())
    }
}

fn grown(v: &DVector<f64>, last: f64) -> DVector<f64> {
    let mut data = v.as_slice().to_vec();
    data.push(last);
    DVector::from_vec(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let mut store = StateStore::new();
        let a = store.add_slot("soleus.activation", 0.1).unwrap();
        let l = store.add_slot("soleus.fiber_length", 0.05).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.slot("soleus.fiber_length").unwrap(), l);
        assert_eq!(store.value(a).unwrap(), 0.1);
        assert_eq!(store.name(l), Some("soleus.fiber_length"));
        assert_eq!(store.values().as_slice(), &[0.1, 0.05]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut store = StateStore::new();
        store.add_slot("x", 0.0).unwrap();
        assert!(store.add_slot("x", 1.0).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_slot_errors() {
        let store = StateStore::new();
        assert!(matches!(
            store.slot("missing"),
            Err(SimError::UnknownSlot { .. })
        ));
        assert!(store.value(SlotId::from_index(3)).is_err());
    }

    #[test]
    fn derivatives_are_separate_from_values() {
        let mut store = StateStore::new();
        let s = store.add_slot("x", 2.0).unwrap();
        store.set_derivative(s, -1.5).unwrap();
        assert_eq!(store.value(s).unwrap(), 2.0);
        assert_eq!(store.derivative(s).unwrap(), -1.5);
    }

    #[test]
    fn bulk_set_checks_length() {
        let mut store = StateStore::new();
        store.add_slot("x", 0.0).unwrap();
        store.add_slot("y", 0.0).unwrap();
        assert!(store.set_values(&DVector::from_vec(vec![1.0])).is_err());
        store
            .set_values(&DVector::from_vec(vec![1.0, 2.0]))
            .unwrap();
        assert_eq!(store.values()[1], 2.0);
    }
}
