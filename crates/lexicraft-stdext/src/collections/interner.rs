//! String interning
//!
//! A string interner represents strings as small integer keys.
//! Only one copy of each distinct string is stored, the key type is `Copy` and
//! cache friendly, and key comparisons are integer comparisons.
//! The cost is that an interned string is never deallocated.
//!
//! Strings are interned with [get_or_intern](Interner::get_or_intern), which
//! returns the same key every time it is given the same string, and recovered
//! with [resolve](Interner::resolve).
//!
//! ```
//! # use lexicraft_stdext::collections::interner::Interner;
//! let mut interner: Interner = Default::default();
//! let hello_1 = interner.get_or_intern("hello");
//! let world_1 = interner.get_or_intern("world");
//! let hello_2 = interner.get_or_intern("hello");
//! assert_eq!(hello_1, hello_2);
//! assert_ne!(hello_1, world_1);
//!
//! assert_eq!(interner.resolve(hello_1), Some("hello"));
//! assert_eq!(interner.resolve(world_1), Some("world"));
//! ```
//!
//! All interned strings live in a single [String] buffer; a vector of end
//! indices records where each string stops. The key is the position of the
//! string's end index in that vector, offset so that key zero is never used.
//! Deduplication goes through a map from the string's hash to the keys with
//! that hash; on the rare hash collision the candidate keys are resolved and
//! compared by value.

use std::collections::hash_map;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::num;

/// Types implementing this trait can be used as keys in the [Interner].
pub trait Key: Copy {
    /// Try to create a key from the provided [usize]. The first [usize]
    /// passed to this method will be 0; the second 1; and so on.
    fn try_from_usize(index: usize) -> Option<Self>;

    /// Convert the key into a [usize].
    fn into_usize(self) -> usize;
}

impl Key for num::NonZeroU32 {
    fn try_from_usize(index: usize) -> Option<Self> {
        let index: u32 = match index.try_into() {
            Ok(index) => index,
            Err(_) => return None,
        };
        num::NonZeroU32::new(index + 1)
    }

    fn into_usize(self) -> usize {
        self.get() as usize
    }
}

/// String interner.
///
/// See the module documentation for information about this data structure.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Interner<K = num::NonZeroU32, S = hash_map::RandomState> {
    buffer: String,
    ends: Vec<usize>,
    // The deduplication map is rebuilt on deserialization because the hash
    // builder changes across processes.
    #[cfg_attr(feature = "serde", serde(skip))]
    dedup: HashMap<u64, Vec<K>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    hash_builder: S,
}

impl<K, S: Default> Default for Interner<K, S> {
    fn default() -> Self {
        Self {
            buffer: Default::default(),
            ends: Default::default(),
            dedup: Default::default(),
            hash_builder: Default::default(),
        }
    }
}

impl<K: Key, S: BuildHasher> Interner<K, S> {
    /// Intern the provided string and return its key.
    pub fn get_or_intern(&mut self, s: &str) -> K {
        let hash = self.hash_builder.hash_one(s);
        if let Some(key) = self.get_interned(s, hash) {
            return key;
        }
        let key = K::try_from_usize(self.ends.len()).unwrap();
        self.buffer.push_str(s);
        self.ends.push(self.buffer.len());
        self.dedup.entry(hash).or_default().push(key);
        key
    }

    /// Get the key for the provided string if it has already been interned.
    ///
    /// This method is useful when the caller only has a shared reference to the interner.
    pub fn get(&self, s: &str) -> Option<K> {
        self.get_interned(s, self.hash_builder.hash_one(s))
    }

    fn get_interned(&self, s: &str, hash: u64) -> Option<K> {
        let candidates = self.dedup.get(&hash)?;
        candidates
            .iter()
            .copied()
            .find(|key| self.resolve(*key) == Some(s))
    }

    /// Return the interned string corresponding to the provided key.
    pub fn resolve(&self, k: K) -> Option<&str> {
        let i = k.into_usize().wrapping_sub(1);
        let start = match i.checked_sub(1) {
            None => 0,
            Some(prev) => *self.ends.get(prev)?,
        };
        let end = *self.ends.get(i)?;
        Some(&self.buffer[start..end])
    }

    /// Iterate over all interned strings with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (K, &str)> {
        let mut start = 0;
        self.ends.iter().enumerate().map(move |(i, end)| {
            let s = &self.buffer[start..*end];
            start = *end;
            (K::try_from_usize(i).unwrap(), s)
        })
    }
}

#[cfg(feature = "serde")]
impl<'de, K: Key, S: Default + BuildHasher> serde::Deserialize<'de> for Interner<K, S> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Deserialized {
            buffer: String,
            ends: Vec<usize>,
        }

        let Deserialized { buffer, ends } = Deserialized::deserialize(deserializer)?;
        let hash_builder = S::default();
        let mut dedup = HashMap::<u64, Vec<K>>::default();
        let mut start: usize = 0;
        for (i, end) in ends.iter().enumerate() {
            let hash = hash_builder.hash_one(&buffer[start..*end]);
            dedup
                .entry(hash)
                .or_default()
                .push(K::try_from_usize(i).unwrap());
            start = *end;
        }
        Ok(Self {
            buffer,
            ends,
            dedup,
            hash_builder,
        })
    }
}
