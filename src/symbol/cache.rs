//! Identity cache: one wrapper per distinct key.
//!
//! Every wrapper kind owns one [`IdentityCache`]. A cache maps a key (an
//! oracle object, or a composite of oracle object + parent + index) to a
//! slot in an append-only arena. The slot index doubles as the wrapper's
//! handle, so handles are cheap `Copy` ids and repeated queries with equal
//! keys hand back the very same `Arc`.
//!
//! Insertion is double-checked: a read-locked probe first, then a
//! write-locked re-probe before the factory runs. The factory therefore
//! runs at most once per key. It runs under the write lock and must not
//! query the same cache again.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// A handle into an identity cache arena.
pub trait ArenaId: Copy + Eq + Hash + fmt::Debug {
    /// Short name of the wrapper kind, used in diagnostics.
    const KIND: &'static str;

    fn from_index(index: usize) -> Self;

    fn index(self) -> usize;
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $crate::symbol::cache::ArenaId for $name {
            const KIND: &'static str = $kind;

            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

pub(crate) use define_id;

struct CacheInner<K, T> {
    index: FxHashMap<K, u32>,
    slots: Vec<Arc<T>>,
}

/// Keyed memoization of wrappers.
pub struct IdentityCache<K, T, I> {
    inner: RwLock<CacheInner<K, T>>,
    _id: PhantomData<fn() -> I>,
}

impl<K, T, I> Default for IdentityCache<K, T, I> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                index: FxHashMap::default(),
                slots: Vec::new(),
            }),
            _id: PhantomData,
        }
    }
}

impl<K, T, I> fmt::Debug for IdentityCache<K, T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCache")
            .field("len", &self.inner.read().slots.len())
            .finish()
    }
}

impl<K, T, I> IdentityCache<K, T, I>
where
    K: Eq + Hash + fmt::Debug,
    I: ArenaId,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the wrapper cached under `key`, creating it with `factory` on
    /// first sight.
    pub fn get_or_create(&self, key: K, factory: impl FnOnce(I) -> T) -> Arc<T> {
        if let Some(found) = self.lookup(&key) {
            return found;
        }

        let mut inner = self.inner.write();
        // Another thread may have won the race between the two locks.
        if let Some(&slot) = inner.index.get(&key) {
            return Arc::clone(&inner.slots[slot as usize]);
        }
        let id = I::from_index(inner.slots.len());
        tracing::trace!(kind = I::KIND, ?key, slot = id.index(), "new wrapper");
        let value = Arc::new(factory(id));
        inner.slots.push(Arc::clone(&value));
        inner.index.insert(key, id.index() as u32);
        value
    }

    /// The wrapper cached under `key`, if any.
    pub fn lookup(&self, key: &K) -> Option<Arc<T>> {
        let inner = self.inner.read();
        inner
            .index
            .get(key)
            .map(|&slot| Arc::clone(&inner.slots[slot as usize]))
    }

    /// Resolve a handle issued by this cache.
    pub fn get(&self, id: I) -> Option<Arc<T>> {
        self.inner.read().slots.get(id.index()).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every wrapper. Handles issued before become stale.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.index.clear();
        inner.slots.clear();
    }
}
