//! Associative containers with a grouping concept.
//!
//! This module provides a wrapper type [ScopedContainer] that gives associative
//! containers a particular kind of scoping semantics.
//! A group is started and finished using the
//! [begin_group](ScopedContainer::begin_group) and
//! [end_group](ScopedContainer::end_group) methods.
//! Insertions in the [local scope](Scope::Local) are rolled back when the group
//! in which they were made ends.
//! Insertions in the [global scope](Scope::Global) persist past the end of every
//! currently open group.
//!
//! Each open group records the previous binding of a key the first time that key
//! is locally mutated inside the group.
//! Ending the group replays these records in reverse order of assignment,
//! restoring each key to its pre-group binding or removing it if there was none.
//!
//! The module also provides implementations where the backing container is a
//! [HashMap] ([ScopedMap]) and a vector ([ScopedVec]).
//!
//! # Examples
//!
//! ```
//! # use lexicraft_stdext::collections::scoped::{ScopedMap, Scope};
//! let mut bindings = ScopedMap::default();
//! bindings.insert("mode", "draft", Scope::Local);
//! bindings.begin_group();
//! bindings.insert("mode", "final", Scope::Local);
//! assert_eq!(bindings.get(&"mode"), Some(&"final"));
//! assert_eq!(bindings.end_group(), Ok(()));
//! assert_eq!(bindings.get(&"mode"), Some(&"draft"));
//! ```
//!
//! A global insertion is visible after all enclosing groups end:
//!
//! ```
//! # use lexicraft_stdext::collections::scoped::{ScopedMap, Scope};
//! let mut bindings = ScopedMap::default();
//! bindings.begin_group();
//! bindings.begin_group();
//! bindings.insert("mode", "final", Scope::Global);
//! assert_eq!(bindings.end_group(), Ok(()));
//! assert_eq!(bindings.end_group(), Ok(()));
//! assert_eq!(bindings.get(&"mode"), Some(&"final"));
//! ```
//!
//! Ending a group when no group is open is an error:
//!
//! ```
//! # use lexicraft_stdext::collections::scoped::{ScopedMap, NoGroupToEndError};
//! let mut bindings = ScopedMap::<&str, &str>::default();
//! assert_eq!(bindings.end_group(), Err(NoGroupToEndError {}));
//! ```

use std::collections::HashMap;
use std::collections::HashSet;
use std::hash::Hash;

/// Trait for containers that can be wrapped using [ScopedContainer].
pub trait BackingContainer<K, V>: Default {
    /// Set the value at the provided key, returning the previous value if there was one.
    fn replace(&mut self, k: K, v: V) -> Option<V>;

    /// Get a reference to the value at the provided key, or `None` if the value doesn't exist.
    fn get(&self, k: &K) -> Option<&V>;

    /// Remove the value with the provided key, if it exists.
    fn remove(&mut self, k: &K);
}

impl<K: Eq + Hash, V> BackingContainer<K, V> for HashMap<K, V> {
    #[inline]
    fn replace(&mut self, k: K, v: V) -> Option<V> {
        HashMap::insert(self, k, v)
    }
    #[inline]
    fn get(&self, k: &K) -> Option<&V> {
        HashMap::get(self, k)
    }
    #[inline]
    fn remove(&mut self, k: &K) {
        HashMap::remove(self, k);
    }
}

impl<V> BackingContainer<usize, V> for Vec<Option<V>> {
    #[inline]
    fn replace(&mut self, k: usize, v: V) -> Option<V> {
        match <[Option<V>]>::get_mut(self, k) {
            None => {
                self.resize_with(k, Default::default);
                self.push(Some(v));
                None
            }
            Some(elem) => elem.replace(v),
        }
    }

    #[inline]
    fn get(&self, k: &usize) -> Option<&V> {
        match <[Option<V>]>::get(self, *k) {
            None => None,
            Some(v) => v.as_ref(),
        }
    }

    #[inline]
    fn remove(&mut self, k: &usize) {
        if let Some(elem) = <[Option<V>]>::get_mut(self, *k) {
            *elem = None;
        }
    }
}

/// Scope determines the visibility of an insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    /// Insertions in the local scope are rolled back at the end of the current group.
    Local,
    /// Insertions in the global scope erase any recorded rollback for the same key
    /// and persist beyond the end of every open group.
    Global,
}

/// Error returned if there is no group to end when [ScopedContainer::end_group] is invoked.
#[derive(Debug, PartialEq, Eq)]
pub struct NoGroupToEndError;

/// A record of the local mutations made within one group.
///
/// The undo list holds the pre-group binding of each key, in order of first
/// assignment; `recorded` prevents a key from being recorded more than once.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        deserialize = "K: Eq + Hash + serde::Deserialize<'de>, V: serde::Deserialize<'de>"
    ))
)]
struct Frame<K, V> {
    recorded: HashSet<K>,
    undo: Vec<(K, Option<V>)>,
}

impl<K, V> Default for Frame<K, V> {
    fn default() -> Self {
        Frame {
            recorded: Default::default(),
            undo: Default::default(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Frame<K, V> {
    fn record(&mut self, key: K, previous: Option<V>) {
        if self.recorded.insert(key.clone()) {
            self.undo.push((key, previous));
        }
    }

    fn forget(&mut self, key: &K) {
        if self.recorded.remove(key) {
            self.undo.retain(|(k, _)| k != key);
        }
    }
}

/// A wrapper around [BackingContainer] types that adds group scoping semantics.
///
/// See the module docs for more information.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        deserialize = "K: Eq + Hash + Clone + serde::Deserialize<'de>, V: serde::Deserialize<'de>, T: serde::Deserialize<'de>"
    ))
)]
pub struct ScopedContainer<K, V, T> {
    backing: T,

    // The global scope is not on the stack: mutations there need no cleanup.
    frames: Vec<Frame<K, V>>,
}

/// A scoped container based on the [HashMap] type.
pub type ScopedMap<K, V> = ScopedContainer<K, V, HashMap<K, V>>;

/// A scoped container based on the [Vec] type.
///
/// The vector is given map semantics with keys of type [usize], which are used
/// as indices for the vector. When inserting an element at a key, the vector is
/// extended if needed so that it can hold an element with that index.
pub type ScopedVec<V> = ScopedContainer<usize, V, Vec<Option<V>>>;

impl<K: Eq + Hash + Clone, V, T: BackingContainer<K, V>> ScopedContainer<K, V, T> {
    /// Inserts the key, value pair in the provided scope.
    pub fn insert(&mut self, key: K, val: V, scope: Scope) {
        match scope {
            Scope::Local => {
                let previous = self.backing.replace(key.clone(), val);
                if let Some(frame) = self.frames.last_mut() {
                    frame.record(key, previous);
                }
            }
            Scope::Global => {
                for frame in &mut self.frames {
                    frame.forget(&key);
                }
                self.backing.replace(key, val);
            }
        }
    }

    /// Retrieves the value at the provided key.
    ///
    /// Lookups always see the innermost visible binding.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.backing.get(key)
    }

    /// Begins a new group.
    pub fn begin_group(&mut self) {
        // An empty frame allocates nothing until a local mutation is recorded.
        self.frames.push(Frame::default());
    }

    /// Attempts to end the current group. Returns an error if there is no group to end.
    pub fn end_group(&mut self) -> Result<(), NoGroupToEndError> {
        match self.frames.pop() {
            None => Err(NoGroupToEndError {}),
            Some(frame) => {
                // Replay in reverse order of first assignment.
                for (key, previous) in frame.undo.into_iter().rev() {
                    match previous {
                        None => self.backing.remove(&key),
                        Some(val) => {
                            self.backing.replace(key, val);
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Returns the number of currently open groups.
    pub fn group_depth(&self) -> usize {
        self.frames.len()
    }

    /// Gets an immutable reference to the backing container.
    ///
    /// It is not possible to obtain a mutable reference to the backing
    /// container, as mutations applied through such a reference could not be
    /// rolled back.
    #[inline]
    pub fn backing_container(&self) -> &T {
        &self.backing
    }
}

impl<K, V, T: Default> Default for ScopedContainer<K, V, T> {
    fn default() -> Self {
        Self {
            backing: Default::default(),
            frames: Default::default(),
        }
    }
}

impl<K: Eq + Hash + Clone, V, T: BackingContainer<K, V>> FromIterator<(K, V)>
    for ScopedContainer<K, V, T>
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map: Self = Default::default();
        for (k, v) in iter {
            map.backing.replace(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_after_rolled_back_insert() {
        let mut map = ScopedMap::default();
        map.begin_group();
        map.insert(3, 5, Scope::Local);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), None);
        map.insert(3, 4, Scope::Local);
        assert_eq!(map.get(&3), Some(&4));
    }

    #[test]
    fn global_insert_with_no_prior_binding() {
        let mut map = ScopedMap::default();
        map.begin_group();
        map.insert(3, 5, Scope::Global);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), Some(&5));
    }

    #[test]
    fn global_insert_overrides_local_insert() {
        let mut map = ScopedMap::default();
        map.insert(3, 1, Scope::Local);
        map.begin_group();
        map.insert(3, 2, Scope::Local);
        map.insert(3, 5, Scope::Global);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&3), Some(&5));
    }

    #[test]
    fn only_first_local_mutation_is_recorded() {
        let mut map = ScopedMap::default();
        map.insert("k", 1, Scope::Local);
        map.begin_group();
        map.insert("k", 2, Scope::Local);
        map.insert("k", 3, Scope::Local);
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&"k"), Some(&1));
    }

    #[test]
    fn restoration_is_in_reverse_order_of_assignment() {
        // The final state is independent of replay order when keys are
        // distinct, so exercise the order through a key reassigned after a
        // global erase inside the same group.
        let mut map = ScopedMap::default();
        map.insert("a", 1, Scope::Local);
        map.begin_group();
        map.insert("a", 2, Scope::Local);
        map.insert("b", 2, Scope::Local);
        map.insert("a", 3, Scope::Global);
        map.insert("a", 4, Scope::Local);
        assert_eq!(map.end_group(), Ok(()));
        // The pre-group binding of "a" was erased by the global insert; the
        // later local insert recorded the global value 3.
        assert_eq!(map.get(&"a"), Some(&3));
        assert_eq!(map.get(&"b"), None);
    }

    #[test]
    fn nested_groups() {
        let mut map = ScopedMap::default();
        map.insert("k", 1, Scope::Local);
        map.begin_group();
        map.insert("k", 2, Scope::Local);
        map.begin_group();
        map.insert("k", 3, Scope::Local);
        assert_eq!(map.get(&"k"), Some(&3));
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&"k"), Some(&2));
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&"k"), Some(&1));
    }

    #[test]
    fn end_group_twice_without_begin_errors() {
        let mut map = ScopedMap::<u32, u32>::default();
        map.begin_group();
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.end_group(), Err(NoGroupToEndError {}));
    }

    #[test]
    fn scoped_vec_extends_on_demand() {
        let mut vec = ScopedVec::default();
        vec.insert(5, "five", Scope::Local);
        assert_eq!(vec.get(&5), Some(&"five"));
        assert_eq!(vec.get(&4), None);
        assert_eq!(vec.get(&6), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let mut map = ScopedMap::default();
        map.insert("k".to_string(), 1, Scope::Local);
        map.begin_group();
        map.insert("k".to_string(), 2, Scope::Local);

        let serialized = serde_json::to_string(&map).unwrap();
        let mut map: ScopedMap<String, i32> = serde_json::from_str(&serialized).unwrap();

        assert_eq!(map.get(&"k".to_string()), Some(&2));
        assert_eq!(map.end_group(), Ok(()));
        assert_eq!(map.get(&"k".to_string()), Some(&1));
    }
}
