//! Captured static members of one translated method

use super::resolver::MemberHandle;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEntry {
    pub name: String,
    pub member: MemberHandle,
}

/// Outcome of [`CaptureTable::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureInsert {
    /// First time the name was seen.
    Added,
    /// The name was already recorded for the same member.
    Known,
    /// The name was already recorded for a different member; the existing
    /// entry was kept.
    Collision,
}

/// Append-only `capture name -> member` table. The first entry recorded for a
/// name wins; entries are never replaced or removed. Iteration follows
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct CaptureTable {
    entries: Vec<CaptureEntry>,
    index: FxHashMap<String, usize>,
}

impl CaptureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, member: MemberHandle) -> CaptureInsert {
        let name = name.into();
        if let Some(&existing) = self.index.get(&name) {
            return if self.entries[existing].member == member {
                CaptureInsert::Known
            } else {
                CaptureInsert::Collision
            };
        }

        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(CaptureEntry { name, member });
        CaptureInsert::Added
    }

    pub fn get(&self, name: &str) -> Option<&MemberHandle> {
        self.index.get(name).map(|&i| &self.entries[i].member)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaptureEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CaptureTable {
    type Item = &'a CaptureEntry;
    type IntoIter = std::slice::Iter<'a, CaptureEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
