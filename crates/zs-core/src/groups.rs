//! Output collections produced by a segmentation pass.

use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Records of one identifier's (possibly merged) active spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup<R> {
    /// The identifier the group is keyed by.
    pub identifier: String,
    /// Records in input order.
    pub records: Vec<R>,
}

/// Match groups keyed by identifier, in order of first creation.
#[derive(Debug, Clone)]
pub struct MatchGroups<R> {
    groups: Vec<MatchGroup<R>>,
    index: HashMap<String, usize>,
}

impl<R> Default for MatchGroups<R> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R> MatchGroups<R> {
    /// Returns the records for `identifier`, if a group exists.
    pub fn get(&self, identifier: &str) -> Option<&[R]> {
        self.index
            .get(identifier)
            .map(|&position| self.groups[position].records.as_slice())
    }

    pub(crate) fn get_mut(&mut self, identifier: &str) -> Option<&mut Vec<R>> {
        self.index
            .get(identifier)
            .map(|&position| &mut self.groups[position].records)
    }

    /// Returns the records for `identifier`, creating an empty group first if needed.
    pub(crate) fn get_or_create(&mut self, identifier: &str) -> &mut Vec<R> {
        let position = if let Some(&position) = self.index.get(identifier) {
            position
        } else {
            tracing::debug!(identifier, "opening match group");
            let position = self.groups.len();
            self.groups.push(MatchGroup {
                identifier: identifier.to_string(),
                records: Vec::new(),
            });
            self.index.insert(identifier.to_string(), position);
            position
        };
        &mut self.groups[position].records
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates groups in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, MatchGroup<R>> {
        self.groups.iter()
    }

    /// Identifiers in creation order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.identifier.as_str())
    }

    /// Total number of records across all groups.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }
}

impl<'a, R> IntoIterator for &'a MatchGroups<R> {
    type Item = &'a MatchGroup<R>;
    type IntoIter = std::slice::Iter<'a, MatchGroup<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Serialized as a JSON object whose keys keep creation order.
impl<R: Serialize> Serialize for MatchGroups<R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.identifier, &group.records)?;
        }
        map.end()
    }
}

/// Overhead groups keyed by sequence number.
///
/// Keys are allocated in increasing order, so key order is creation order.
pub type OverheadGroups<R> = BTreeMap<u32, Vec<R>>;

/// The result of one segmentation pass.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Segmentation<R> {
    /// Active spans grouped by identifier.
    pub matches: MatchGroups<R>,

    /// Confirmed idle spans keyed by sequence number, starting at 1.
    pub overhead: OverheadGroups<R>,

    /// Short-gap records dropped because a different identifier resumed.
    pub discarded: Vec<R>,

    /// Records dropped by an internal consistency fault.
    pub dropped: usize,
}

impl<R> Default for Segmentation<R> {
    fn default() -> Self {
        Self {
            matches: MatchGroups::default(),
            overhead: BTreeMap::new(),
            discarded: Vec::new(),
            dropped: 0,
        }
    }
}

impl<R> Segmentation<R> {
    /// Total number of records across all overhead groups.
    pub fn overhead_record_count(&self) -> usize {
        self.overhead.values().map(Vec::len).sum()
    }
}
