use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{Result, SerdesError};
use crate::iterator::SeriesIterator;
use crate::types::{GroupId, SeriesId};

/// An iterator over one series for a particular sample type.
///
/// Only numeric samples are supported today; other sample types would sit
/// beside it in the same [`GroupEntry`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TypedIterator {
    Numeric(SeriesIterator),
}

impl TypedIterator {
    pub fn id(&self) -> &SeriesId {
        match self {
            TypedIterator::Numeric(it) => it.id(),
        }
    }
}

/// One series slot within a group: an id and its typed iterators.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    id: SeriesId,
    iterators: Vec<TypedIterator>,
}

impl GroupEntry {
    pub(crate) fn numeric_only(iterator: SeriesIterator) -> Self {
        Self {
            id: iterator.id().clone(),
            iterators: vec![TypedIterator::Numeric(iterator)],
        }
    }

    pub fn id(&self) -> &SeriesId {
        &self.id
    }

    pub fn iterators(&self) -> &[TypedIterator] {
        &self.iterators
    }

    pub fn numeric(&self) -> Option<&SeriesIterator> {
        self.iterators.iter().find_map(|t| match t {
            TypedIterator::Numeric(it) => Some(it),
        })
    }

    pub fn numeric_mut(&mut self) -> Option<&mut SeriesIterator> {
        self.iterators.iter_mut().find_map(|t| match t {
            TypedIterator::Numeric(it) => Some(it),
        })
    }
}

/// A named, insertion-ordered bundle of series.
///
/// Entries are keyed by series id and keep their insertion position, so
/// lookups by id and by index are both constant time.
#[derive(Debug, Clone, PartialEq)]
pub struct IteratorGroup {
    id: GroupId,
    entries: IndexMap<SeriesId, GroupEntry>,
}

impl IteratorGroup {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            entries: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// Adds an iterator, creating a new entry at the end if its series id is
    /// not yet present.
    ///
    /// Fails with `DuplicateIterator` if the series already has a numeric
    /// iterator in this group.
    pub fn add_iterator(&mut self, iterator: SeriesIterator) -> Result<()> {
        self.try_push_entry(iterator).map_err(|iterator| SerdesError::DuplicateIterator {
            group: self.id.to_string(),
            series: iterator.id().to_string(),
        })
    }

    /// Appends a new entry, handing the iterator back if its id is taken.
    pub(crate) fn try_push_entry(
        &mut self,
        iterator: SeriesIterator,
    ) -> std::result::Result<(), SeriesIterator> {
        match self.entries.entry(iterator.id().clone()) {
            Entry::Occupied(_) => Err(iterator),
            Entry::Vacant(slot) => {
                slot.insert(GroupEntry::numeric_only(iterator));
                Ok(())
            }
        }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &GroupEntry> {
        self.entries.values()
    }

    pub fn entries_mut(&mut self) -> impl ExactSizeIterator<Item = &mut GroupEntry> {
        self.entries.values_mut()
    }

    /// Returns the entry at `index`, in insertion order.
    pub fn entry(&self, index: usize) -> Option<&GroupEntry> {
        self.entries.get_index(index).map(|(_, entry)| entry)
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut GroupEntry> {
        self.entries.get_index_mut(index).map(|(_, entry)| entry)
    }

    pub fn find(&self, id: &SeriesId) -> Option<&GroupEntry> {
        self.entries.get(id)
    }

    /// Position of the entry for `id`, if present.
    pub fn position(&self, id: &SeriesId) -> Option<usize> {
        self.entries.get_index_of(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full collection: groups keyed by id, iterated in insertion order.
///
/// # Example
/// ```
/// use series_serdes::{GroupId, IteratorGroups, SeriesId, SeriesIterator};
///
/// let id = SeriesId::builder().metric("sys.cpu.user").tag("host", "web01").build().unwrap();
/// let mut groups = IteratorGroups::new();
/// groups.add_iterator("a", SeriesIterator::builder(id.clone()).push(1000, 42i64, 1).build()).unwrap();
///
/// let group = groups.group(&GroupId::from("a")).unwrap();
/// assert_eq!(group.entry(0).unwrap().id(), &id);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IteratorGroups {
    groups: IndexMap<GroupId, IteratorGroup>,
}

impl IteratorGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series iterator to a group, creating the group on first use.
    pub fn add_iterator(&mut self, group: impl Into<GroupId>, iterator: SeriesIterator) -> Result<()> {
        let id = group.into();
        self.groups
            .entry(id)
            .or_insert_with_key(|id| IteratorGroup::new(id.clone()))
            .add_iterator(iterator)
    }

    /// Appends a fully built group. Returns the group back if its id is
    /// already present.
    pub(crate) fn insert_group(&mut self, group: IteratorGroup) -> std::result::Result<(), IteratorGroup> {
        match self.groups.entry(group.id().clone()) {
            Entry::Occupied(_) => Err(group),
            Entry::Vacant(slot) => {
                slot.insert(group);
                Ok(())
            }
        }
    }

    pub fn group(&self, id: &GroupId) -> Option<&IteratorGroup> {
        self.groups.get(id)
    }

    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut IteratorGroup> {
        self.groups.get_mut(id)
    }

    /// Groups in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &IteratorGroup> {
        self.groups.values()
    }

    pub fn group_ids(&self) -> impl ExactSizeIterator<Item = &GroupId> {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<'a> IntoIterator for &'a IteratorGroups {
    type Item = &'a IteratorGroup;
    type IntoIter = indexmap::map::Values<'a, GroupId, IteratorGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.values()
    }
}
