//! Pending change set of one editing session.
//!
//! Three views over identifier keys:
//!
//! - **baseline**: the value shown before the first live edit, updated when
//!   a save of that identifier succeeds
//! - **touched**: live-previewed but neither staged nor saved
//! - **staged**: the Dirty set, waiting for save-all
//!
//! The persistence layer never sees this structure; save paths take owned
//! [`StagedChange`]s out of it and hand back the ones that failed.

use crate::surface::ChosenFile;
use liveedit_common::{BindingValue, Capability, Category};
use std::collections::{BTreeMap, BTreeSet};

pub type ChangeKey = (Category, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChange {
    pub capability: Capability,
    pub identifier: String,
    /// Value as previewed; a chosen image previews as a `data:` URL
    pub value: BindingValue,
    /// Image to upload before the record is written
    pub upload: Option<ChosenFile>,
    /// Asset URL this change stops referencing
    pub replaces: Option<String>,
}

impl StagedChange {
    pub fn key(&self) -> ChangeKey {
        (self.capability.category(), self.identifier.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PendingChanges {
    baselines: BTreeMap<ChangeKey, BindingValue>,
    touched: BTreeSet<ChangeKey>,
    staged: BTreeMap<ChangeKey, StagedChange>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a live edit; the baseline is captured only on the first one
    pub fn touch(&mut self, key: ChangeKey, baseline: impl FnOnce() -> Option<BindingValue>) {
        if !self.baselines.contains_key(&key) {
            if let Some(value) = baseline() {
                self.baselines.insert(key.clone(), value);
            }
        }
        if !self.staged.contains_key(&key) {
            self.touched.insert(key);
        }
    }

    pub fn stage(&mut self, change: StagedChange) {
        let key = change.key();
        self.touched.remove(&key);
        self.staged.insert(key, change);
    }

    /// Take the staged changes of the given keys out of the Dirty set
    pub fn take_staged(&mut self, keys: &[ChangeKey]) -> Vec<StagedChange> {
        keys.iter().filter_map(|key| self.staged.remove(key)).collect()
    }

    pub fn take_all_staged(&mut self) -> Vec<StagedChange> {
        std::mem::take(&mut self.staged).into_values().collect()
    }

    /// A save of `key` succeeded: it is clean and `value` is its new baseline
    pub fn committed(&mut self, key: ChangeKey, value: BindingValue) {
        self.touched.remove(&key);
        self.staged.remove(&key);
        self.baselines.insert(key, value);
    }

    /// Forget every live edit and staged change, returning the keys whose
    /// preview must be reverted with their baselines
    pub fn discard(&mut self) -> Vec<(ChangeKey, Option<BindingValue>)> {
        let mut keys: BTreeSet<ChangeKey> = std::mem::take(&mut self.touched);
        keys.extend(std::mem::take(&mut self.staged).into_keys());
        keys.into_iter()
            .map(|key| {
                let baseline = self.baselines.remove(&key);
                (key, baseline)
            })
            .collect()
    }

    pub fn baseline(&self, key: &ChangeKey) -> Option<&BindingValue> {
        self.baselines.get(key)
    }

    pub fn staged(&self, key: &ChangeKey) -> Option<&StagedChange> {
        self.staged.get(key)
    }

    pub fn is_dirty(&self) -> bool {
        !self.staged.is_empty()
    }

    pub fn dirty_len(&self) -> usize {
        self.staged.len()
    }

    /// Identifiers in the Dirty set, sorted
    pub fn dirty_ids(&self) -> Vec<String> {
        let ids: BTreeSet<&str> = self.staged.keys().map(|(_, id)| id.as_str()).collect();
        ids.into_iter().map(str::to_string).collect()
    }

    pub fn is_touched(&self, key: &ChangeKey) -> bool {
        self.touched.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_change(id: &str, value: &str) -> StagedChange {
        StagedChange {
            capability: Capability::Text,
            identifier: id.to_string(),
            value: BindingValue::Text(value.to_string()),
            upload: None,
            replaces: None,
        }
    }

    fn key(id: &str) -> ChangeKey {
        (Category::Text, id.to_string())
    }

    #[test]
    fn test_baseline_captured_at_first_edit() {
        let mut pending = PendingChanges::new();
        pending.touch(key("a"), || Some(BindingValue::Text("Hello".to_string())));
        pending.touch(key("a"), || Some(BindingValue::Text("Hello!!".to_string())));

        assert_eq!(
            pending.baseline(&key("a")),
            Some(&BindingValue::Text("Hello".to_string()))
        );
        assert!(pending.is_touched(&key("a")));
        assert!(!pending.is_dirty());
    }

    #[test]
    fn test_commit_moves_baseline() {
        let mut pending = PendingChanges::new();
        pending.touch(key("a"), || Some(BindingValue::Text("Hello".to_string())));
        pending.stage(text_change("a", "Hi"));
        assert_eq!(pending.dirty_ids(), vec!["a".to_string()]);

        pending.committed(key("a"), BindingValue::Text("Hi".to_string()));
        assert!(!pending.is_dirty());
        assert_eq!(
            pending.baseline(&key("a")),
            Some(&BindingValue::Text("Hi".to_string()))
        );
    }

    #[test]
    fn test_discard_returns_every_edit() {
        let mut pending = PendingChanges::new();
        pending.touch(key("a"), || Some(BindingValue::Text("A".to_string())));
        pending.stage(text_change("a", "A2"));
        pending.touch(key("b"), || None);

        let reverted = pending.discard();
        assert_eq!(reverted.len(), 2);
        assert_eq!(reverted[0].1, Some(BindingValue::Text("A".to_string())));
        assert!(!pending.is_dirty());
        assert!(pending.discard().is_empty());
    }
}
