use crate::decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Variable bindings for one calculator session.
///
/// Names are case-sensitive and stored without the leading `$`. Reading a name
/// that was never assigned yields zero.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct VariableStore {
    values: BTreeMap<String, Decimal>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self { values: BTreeMap::new() }
    }

    /// Current value of `name`, or zero when unbound.
    pub fn get(&self, name: &str) -> Decimal {
        match self.values.get(name) {
            Some(value) => value.clone(),
            None => {
                log::debug!("variable ${} is unbound, reading as 0", name);
                Decimal::zero()
            }
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Decimal) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pretty JSON object of every binding, values at full scale.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
