use crate::domain::errors::{SchemaError, SchemaViolation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One recording submitted by a caller: field name -> value (scalars or nested mappings)
pub type Record = Map<String, Value>;

/// Recorded values of one group, one sequence per field.
///
/// Every sequence has the same length: the Nth entries of all fields were
/// recorded together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSeries {
    fields: BTreeMap<String, Vec<Value>>,
}

impl GroupSeries {
    fn from_record(record: Record) -> Self {
        Self {
            fields: record.into_iter().map(|(k, v)| (k, vec![v])).collect(),
        }
    }

    /// Both directions are checked before anything is appended.
    fn check(&self, group: &str, record: &Record) -> Result<(), SchemaError> {
        if let Some(key) = self.fields.keys().find(|k| !record.contains_key(k.as_str())) {
            return Err(SchemaError {
                group: group.to_string(),
                key: key.clone(),
                violation: SchemaViolation::MissingKey,
            });
        }

        if let Some(key) = record.keys().find(|k| !self.fields.contains_key(k.as_str())) {
            return Err(SchemaError {
                group: group.to_string(),
                key: key.clone(),
                violation: SchemaViolation::UnrecognizedKey,
            });
        }

        Ok(())
    }

    fn append(&mut self, record: Record) {
        for (key, value) in record {
            if let Some(series) = self.fields.get_mut(&key) {
                series.push(value);
            }
        }
    }

    pub fn field(&self, name: &str) -> Option<&[Value]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of recordings made for this group
    pub fn recordings(&self) -> usize {
        self.fields.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Returns the values of recording `index` as a record, if it exists
    pub fn recording(&self, index: usize) -> Option<Record> {
        if index >= self.recordings() {
            return None;
        }
        Some(
            self.fields
                .iter()
                .filter_map(|(k, v)| v.get(index).map(|value| (k.clone(), value.clone())))
                .collect(),
        )
    }

    pub fn latest(&self) -> Option<Record> {
        self.recordings()
            .checked_sub(1)
            .and_then(|index| self.recording(index))
    }

    /// Shortest and longest field sequence, or `None` for a group with no fields
    pub fn length_bounds(&self) -> Option<(usize, usize)> {
        let shortest = self.fields.values().map(Vec::len).min()?;
        let longest = self.fields.values().map(Vec::len).max()?;
        Some((shortest, longest))
    }
}

/// In-memory performance memory: group name -> per-field recorded sequences.
///
/// Serializes as `{"group": {"field": [v0, v1, ...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceStore {
    groups: BTreeMap<String, GroupSeries>,
}

impl PerformanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one recording to `group`, creating the group on first use.
    ///
    /// The first recording fixes the group's key set. Later recordings must carry
    /// exactly that key set; otherwise the store is left untouched and a
    /// `SchemaError` is returned. Returns the group's recording count afterwards.
    pub fn record(&mut self, group: &str, record: Record) -> Result<usize, SchemaError> {
        match self.groups.get_mut(group) {
            Some(series) => {
                series.check(group, &record)?;
                series.append(record);
                Ok(series.recordings())
            }
            None => {
                let series = GroupSeries::from_record(record);
                let count = series.recordings();
                self.groups.insert(group.to_string(), series);
                Ok(count)
            }
        }
    }

    pub fn group(&self, name: &str) -> Option<&GroupSeries> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupSeries)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn series(&self, group: &str, field: &str) -> Option<&[Value]> {
        self.groups.get(group).and_then(|g| g.field(field))
    }

    pub fn recordings(&self, group: &str) -> usize {
        self.groups.get(group).map_or(0, GroupSeries::recordings)
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// First group whose field sequences differ in length, with its (shortest, longest)
    pub fn find_ragged_group(&self) -> Option<(&str, usize, usize)> {
        self.groups.iter().find_map(|(name, series)| match series.length_bounds() {
            Some((shortest, longest)) if shortest != longest => {
                Some((name.as_str(), shortest, longest))
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn test_first_recording_creates_group() {
        let mut store = PerformanceStore::new();
        let count = store
            .record("epoch", record(json!({"loss": 0.5, "acc": 0.9})))
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(store.series("epoch", "loss").unwrap(), &[json!(0.5)]);
        assert_eq!(store.series("epoch", "acc").unwrap(), &[json!(0.9)]);
    }

    #[test]
    fn test_consistent_recordings_stay_aligned() {
        let mut store = PerformanceStore::new();
        let n = 25;
        for i in 0..n {
            store
                .record(
                    "step",
                    record(json!({"loss": 1.0 / (i as f64 + 1.0), "index": i, "tag": format!("s{i}")})),
                )
                .unwrap();
        }

        let group = store.group("step").unwrap();
        assert_eq!(group.recordings(), n);
        for (_, values) in group.fields() {
            assert_eq!(values.len(), n);
        }
        for i in 0..n {
            assert_eq!(group.field("index").unwrap()[i], json!(i));
            assert_eq!(group.field("tag").unwrap()[i], json!(format!("s{i}")));
            assert_eq!(group.field("loss").unwrap()[i], json!(1.0 / (i as f64 + 1.0)));
        }
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let mut store = PerformanceStore::new();
        store.record("g", record(json!({"a": 1, "b": 2}))).unwrap();
        store.record("g", record(json!({"b": 4, "a": 3}))).unwrap();

        assert_eq!(store.series("g", "a").unwrap(), &[json!(1), json!(3)]);
        assert_eq!(store.series("g", "b").unwrap(), &[json!(2), json!(4)]);
    }

    #[test]
    fn test_missing_key_is_rejected_without_mutation() {
        let mut store = PerformanceStore::new();
        store.record("g", record(json!({"a": 1, "b": 2}))).unwrap();
        let before = store.clone();

        let err = store.record("g", record(json!({"a": 3}))).unwrap_err();

        assert_eq!(err.violation, SchemaViolation::MissingKey);
        assert_eq!(err.key, "b");
        assert_eq!(err.group, "g");
        assert_eq!(store, before);
    }

    #[test]
    fn test_unrecognized_key_is_rejected_without_mutation() {
        let mut store = PerformanceStore::new();
        store.record("g", record(json!({"a": 1}))).unwrap();
        let before = store.clone();

        let err = store.record("g", record(json!({"a": 2, "c": 5}))).unwrap_err();

        assert_eq!(err.violation, SchemaViolation::UnrecognizedKey);
        assert_eq!(err.key, "c");
        assert_eq!(store, before);
        assert_eq!(store.recordings("g"), 1);
    }

    #[test]
    fn test_missing_key_is_reported_before_unrecognized_key() {
        let mut store = PerformanceStore::new();
        store.record("g", record(json!({"a": 1}))).unwrap();

        let err = store.record("g", record(json!({"z": 2}))).unwrap_err();
        assert_eq!(err.violation, SchemaViolation::MissingKey);
        assert_eq!(err.key, "a");
    }

    #[test]
    fn test_groups_are_independent() {
        let mut store = PerformanceStore::new();
        store.record("train", record(json!({"loss": 0.4}))).unwrap();
        store.record("eval", record(json!({"acc": 0.8, "f1": 0.7}))).unwrap();
        store.record("train", record(json!({"loss": 0.2}))).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.recordings("train"), 2);
        assert_eq!(store.recordings("eval"), 1);
        assert_eq!(store.recordings("missing"), 0);
    }

    #[test]
    fn test_nested_values_are_stored_verbatim() {
        let mut store = PerformanceStore::new();
        let nested = json!({"per_class": {"cat": 0.9, "dog": 0.8}, "count": 3});
        store.record("eval", record(nested)).unwrap();

        assert_eq!(
            store.series("eval", "per_class").unwrap(),
            &[json!({"cat": 0.9, "dog": 0.8})]
        );
    }

    #[test]
    fn test_empty_first_recording_locks_empty_key_set() {
        let mut store = PerformanceStore::new();
        assert_eq!(store.record("g", Record::new()).unwrap(), 0);
        assert!(store.contains_group("g"));

        let err = store.record("g", record(json!({"a": 1}))).unwrap_err();
        assert_eq!(err.violation, SchemaViolation::UnrecognizedKey);
    }

    #[test]
    fn test_latest_and_recording_access() {
        let mut store = PerformanceStore::new();
        store.record("g", record(json!({"a": 1, "b": "x"}))).unwrap();
        store.record("g", record(json!({"a": 2, "b": "y"}))).unwrap();

        let group = store.group("g").unwrap();
        assert_eq!(group.recording(0).unwrap(), record(json!({"a": 1, "b": "x"})));
        assert_eq!(group.latest().unwrap(), record(json!({"a": 2, "b": "y"})));
        assert!(group.recording(2).is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let mut store = PerformanceStore::new();
        store.record("epoch", record(json!({"loss": 0.5, "acc": 0.9}))).unwrap();
        store.record("epoch", record(json!({"loss": 0.3, "acc": 0.95}))).unwrap();

        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(
            value,
            json!({"epoch": {"loss": [0.5, 0.3], "acc": [0.9, 0.95]}})
        );
    }

    #[test]
    fn test_find_ragged_group() {
        let ragged: PerformanceStore =
            serde_json::from_value(json!({"ok": {"a": [1, 2]}, "bad": {"a": [1], "b": [1, 2, 3]}}))
                .unwrap();
        assert_eq!(ragged.find_ragged_group(), Some(("bad", 1, 3)));

        let dense: PerformanceStore =
            serde_json::from_value(json!({"ok": {"a": [1, 2], "b": [3, 4]}, "empty": {}})).unwrap();
        assert_eq!(dense.find_ragged_group(), None);
    }
}
