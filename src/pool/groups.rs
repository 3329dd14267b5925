//! Group index: partitions resources into labelled groups.
//!
//! A resource belongs to exactly one group. The first assignment wins;
//! only an explicit `reassign` (after re-validation) moves a resource.

use std::collections::{BTreeSet, HashMap};

use crate::pool::types::Resource;

/// Label used for resources admitted without a group.
pub const DEFAULT_GROUP: &str = "default";

#[derive(Debug, Default, Clone)]
pub struct GroupIndex {
    groups: HashMap<String, BTreeSet<Resource>>,
    membership: HashMap<Resource, String>,
}

impl GroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a resource to a group. Returns false if it already has one.
    pub fn assign(&mut self, resource: Resource, group: &str) -> bool {
        if self.membership.contains_key(&resource) {
            return false;
        }
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(resource.clone());
        self.membership.insert(resource, group.to_string());
        true
    }

    /// Move a resource to a new group.
    pub fn reassign(&mut self, resource: Resource, group: &str) {
        if let Some(previous) = self.membership.remove(&resource) {
            if let Some(members) = self.groups.get_mut(&previous) {
                members.remove(&resource);
                if members.is_empty() {
                    self.groups.remove(&previous);
                }
            }
        }
        self.assign(resource, group);
    }

    pub fn members(&self, group: &str) -> Option<&BTreeSet<Resource>> {
        self.groups.get(group)
    }

    pub fn group_of(&self, resource: &Resource) -> Option<&str> {
        self.membership.get(resource).map(String::as_str)
    }

    /// Group labels in sorted order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}
