//! Base implementation of records.
use crate::error::RecordError;
use std::collections::HashMap;

/// A value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, such as a loss.
    Scalar(f32),
}

/// Named values produced by an optimization step or an episode.
///
/// # Examples
///
/// ```rust
/// use tractor_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("loss", 0.5);
/// record.insert("episode", RecordValue::Scalar(3.0));
/// let loss = record.get_scalar("loss").unwrap();
/// assert_eq!(loss, 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, RecordError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            None => Err(RecordError::RecordKeyError(k.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_keys_are_reported() {
        let mut record = Record::from_scalar("loss", 1.5);
        record.insert("loss", RecordValue::Scalar(0.5));

        assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
        assert!(matches!(
            record.get_scalar("missing"),
            Err(RecordError::RecordKeyError(_))
        ));
    }
}
