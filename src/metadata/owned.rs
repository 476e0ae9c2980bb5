//! Ordered collections that own the back-reference of their items.
//!
//! An item stored in an [`OwnedCollection`] knows which entity owns it through its
//! [`OwnerLink`]. The link can only be changed by a collection, so the two sides never
//! disagree: an item belongs to at most one collection, and that collection contains it.
//! Adding an item that belongs elsewhere moves it, removing it from the previous collection
//! in the same step.
//!
//! Back-references are weak. Dropping an owner leaves its items orphaned rather than keeping
//! the owner alive.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use dotmodel::prelude::*;
//!
//! let module = ModuleDefinition::new("Sample.dll");
//! let first = TypeDefinition::new("Sample", "First", TypeAttributes::PUBLIC, None);
//! let second = TypeDefinition::new("Sample", "Second", TypeAttributes::PUBLIC, None);
//!
//! let property = PropertyDefinition::new("Value", PropertyAttributes::empty(), None);
//! first.properties().add(property.clone());
//! assert!(Arc::ptr_eq(&property.declaring_type().unwrap(), &first));
//!
//! // Moving the property detaches it from its previous declaring type
//! second.properties().add(property.clone());
//! assert!(first.properties().is_empty());
//! assert!(Arc::ptr_eq(&property.declaring_type().unwrap(), &second));
//! # drop(module);
//! ```

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, OnceLock, RwLock, Weak,
    },
};

use crate::{Error::OutOfBounds, Result};

/// Implemented by entities that can be stored in an [`OwnedCollection`] owned by an `O`.
pub trait Owned<O: ?Sized>: Sized {
    /// The link through which the owning collection is recorded
    fn owner_link(&self) -> &OwnerLink<O, Self>;
}

struct CollectionInner<O: ?Sized, T> {
    owner: Weak<O>,
    items: RwLock<Vec<Arc<T>>>,
}

type Materializer = Box<dyn FnOnce() + Send>;

/// The back-reference of an item to the collection that holds it.
///
/// Only [`OwnedCollection`] can change where a link points. A backed item may carry a
/// deferred materializer that loads the collection it belongs to, so the owner can be found
/// before anyone has enumerated that collection.
///
/// Once any collection has adopted the item, item sources no longer place it: a backed
/// collection read after the item was moved leaves it where it is.
pub struct OwnerLink<O: ?Sized, T> {
    slot: RwLock<Option<Weak<CollectionInner<O, T>>>>,
    pending: Mutex<Option<Materializer>>,
    claimed: AtomicBool,
}

impl<O: ?Sized, T> OwnerLink<O, T> {
    /// A link that belongs to no collection
    #[must_use]
    pub fn new() -> Self {
        OwnerLink {
            slot: RwLock::new(None),
            pending: Mutex::new(None),
            claimed: AtomicBool::new(false),
        }
    }

    /// A link whose owner is established by running `materialize` on first query.
    ///
    /// `materialize` is expected to load the collection that will adopt the item. It runs at
    /// most once, and not at all if a collection adopts the item first.
    #[must_use]
    pub fn deferred<F>(materialize: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        OwnerLink {
            slot: RwLock::new(None),
            pending: Mutex::new(Some(Box::new(materialize))),
            claimed: AtomicBool::new(false),
        }
    }

    /// The entity owning the collection this item belongs to
    pub fn owner(&self) -> Option<Arc<O>> {
        self.run_pending();

        let inner = read_lock!(self.slot).as_ref()?.upgrade()?;
        inner.owner.upgrade()
    }

    /// Returns true if the item currently belongs to a live collection
    pub fn is_owned(&self) -> bool {
        self.run_pending();

        read_lock!(self.slot)
            .as_ref()
            .is_some_and(|inner| inner.strong_count() > 0)
    }

    // The lock is held while the materializer runs so concurrent queries wait for it. The
    // collection adopting this item skips `discard_pending` while the lock is taken.
    fn run_pending(&self) {
        let mut pending = lock!(self.pending);

        if let Some(materialize) = pending.take() {
            materialize();
        }
    }

    fn discard_pending(&self) {
        if let Ok(mut pending) = self.pending.try_lock() {
            pending.take();
        }
    }
}

impl<O: ?Sized, T> Default for OwnerLink<O, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ?Sized, T> fmt::Debug for OwnerLink<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owned = read_lock!(self.slot)
            .as_ref()
            .is_some_and(|inner| inner.strong_count() > 0);
        f.debug_struct("OwnerLink").field("owned", &owned).finish()
    }
}

/// An ordered collection of `T` owned by an `O`.
///
/// Mutation goes through `&self`; concurrent writers on the same collection must be
/// serialized by the caller. Reads return snapshots and are safe from any thread.
pub struct OwnedCollection<O: ?Sized, T> {
    inner: Arc<CollectionInner<O, T>>,
}

impl<O: ?Sized, T: Owned<O>> OwnedCollection<O, T> {
    /// Creates an empty collection owned by `owner`
    #[must_use]
    pub fn new(owner: Weak<O>) -> Self {
        OwnedCollection {
            inner: Arc::new(CollectionInner {
                owner,
                items: RwLock::new(Vec::new()),
            }),
        }
    }

    /// The entity owning this collection, if it is still alive
    pub fn owner(&self) -> Option<Arc<O>> {
        self.inner.owner.upgrade()
    }

    /// Appends `item`, detaching it from any previous collection first
    pub fn add(&self, item: Arc<T>) {
        let link = item.owner_link();
        link.discard_pending();

        let mut slot = write_lock!(link.slot);
        link.claimed.store(true, Ordering::Release);
        self.detach_from(&mut slot, &item);

        write_lock!(self.inner.items).push(item.clone());
        *slot = Some(Arc::downgrade(&self.inner));
    }

    /// Appends `item` only if no collection has ever adopted it.
    ///
    /// Used when filling a collection from its item source. Returns false, leaving the item
    /// untouched, if it was placed elsewhere before the source ran.
    pub(crate) fn adopt_if_unclaimed(&self, item: Arc<T>) -> bool {
        let link = item.owner_link();

        let mut slot = write_lock!(link.slot);
        if link.claimed.swap(true, Ordering::AcqRel) {
            return false;
        }
        link.discard_pending();

        write_lock!(self.inner.items).push(item.clone());
        *slot = Some(Arc::downgrade(&self.inner));
        true
    }

    /// Inserts `item` at position `at`, detaching it from any previous collection first.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `at` is greater than the length of the
    /// collection. Nothing is modified in that case.
    pub fn insert(&self, at: usize, item: Arc<T>) -> Result<()> {
        if at > self.len() {
            return Err(OutOfBounds);
        }

        let link = item.owner_link();
        link.discard_pending();

        let mut slot = write_lock!(link.slot);
        link.claimed.store(true, Ordering::Release);
        self.detach_from(&mut slot, &item);

        let mut items = write_lock!(self.inner.items);
        let at = at.min(items.len());
        items.insert(at, item.clone());
        drop(items);

        *slot = Some(Arc::downgrade(&self.inner));
        Ok(())
    }

    /// Removes `item` and clears its back-reference. Returns false if it was not present.
    pub fn remove(&self, item: &Arc<T>) -> bool {
        let mut slot = write_lock!(item.owner_link().slot);
        let belongs_here = slot
            .as_ref()
            .is_some_and(|current| std::ptr::eq(current.as_ptr(), Arc::as_ptr(&self.inner)));
        if !belongs_here {
            return false;
        }

        write_lock!(self.inner.items).retain(|existing| !Arc::ptr_eq(existing, item));
        *slot = None;
        true
    }

    /// Removes every item and clears their back-references
    pub fn clear(&self) {
        let items = std::mem::take(&mut *write_lock!(self.inner.items));

        for item in items {
            let mut slot = write_lock!(item.owner_link().slot);
            let belongs_here = slot
                .as_ref()
                .is_some_and(|current| std::ptr::eq(current.as_ptr(), Arc::as_ptr(&self.inner)));
            if belongs_here {
                *slot = None;
            }
        }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        read_lock!(self.inner.items).len()
    }

    /// Returns true if the collection holds no items
    pub fn is_empty(&self) -> bool {
        read_lock!(self.inner.items).is_empty()
    }

    /// The item at `index`
    pub fn get(&self, index: usize) -> Option<Arc<T>> {
        read_lock!(self.inner.items).get(index).cloned()
    }

    /// A snapshot of the items in insertion order
    pub fn iter(&self) -> std::vec::IntoIter<Arc<T>> {
        read_lock!(self.inner.items).clone().into_iter()
    }

    /// Returns true if `item` is stored in this collection
    pub fn contains(&self, item: &Arc<T>) -> bool {
        self.index_of(item).is_some()
    }

    /// Position of `item` in this collection
    pub fn index_of(&self, item: &Arc<T>) -> Option<usize> {
        read_lock!(self.inner.items)
            .iter()
            .position(|existing| Arc::ptr_eq(existing, item))
    }

    /// The first item matching `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Option<Arc<T>>
    where
        P: FnMut(&T) -> bool,
    {
        read_lock!(self.inner.items)
            .iter()
            .find(|item| predicate(item))
            .cloned()
    }

    fn detach_from(&self, slot: &mut Option<Weak<CollectionInner<O, T>>>, item: &Arc<T>) {
        let previous = slot.take().and_then(|weak| weak.upgrade());
        if let Some(previous) = previous {
            write_lock!(previous.items).retain(|existing| !Arc::ptr_eq(existing, item));
        }
    }
}

impl<O: ?Sized, T> fmt::Debug for OwnedCollection<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedCollection")
            .field("len", &read_lock!(self.inner.items).len())
            .finish()
    }
}

/// The items of a lazily populated collection.
pub type ItemSource<T> = Box<dyn Fn() -> Vec<Arc<T>> + Send + Sync>;

/// An [`OwnedCollection`] populated from an item source on first access.
///
/// Synthetic entities create these empty. Backed entities plug in a source that produces the
/// items found in the backing metadata; items that fail to load are reported by the source and
/// left out.
pub struct LazyOwnedCollection<O: ?Sized, T> {
    owner: Weak<O>,
    collection: OnceLock<OwnedCollection<O, T>>,
    source: Option<ItemSource<T>>,
}

impl<O: ?Sized, T: Owned<O>> LazyOwnedCollection<O, T> {
    /// An empty collection owned by `owner`
    #[must_use]
    pub fn new(owner: Weak<O>) -> Self {
        LazyOwnedCollection {
            owner,
            collection: OnceLock::new(),
            source: None,
        }
    }

    /// A collection owned by `owner` that is filled from `source` on first access
    pub fn from_source<F>(owner: Weak<O>, source: F) -> Self
    where
        F: Fn() -> Vec<Arc<T>> + Send + Sync + 'static,
    {
        LazyOwnedCollection {
            owner,
            collection: OnceLock::new(),
            source: Some(Box::new(source)),
        }
    }

    /// A collection owned by `owner`, filled from `source` if one is given
    pub fn with_source(owner: Weak<O>, source: Option<ItemSource<T>>) -> Self {
        LazyOwnedCollection {
            owner,
            collection: OnceLock::new(),
            source,
        }
    }

    /// The collection, materializing it on first access
    pub fn get(&self) -> &OwnedCollection<O, T> {
        self.collection.get_or_init(|| {
            let collection = OwnedCollection::new(self.owner.clone());
            if let Some(source) = &self.source {
                for item in source() {
                    collection.adopt_if_unclaimed(item);
                }
            }
            collection
        })
    }

    /// Returns true if the collection has been materialized
    pub fn is_materialized(&self) -> bool {
        self.collection.get().is_some()
    }
}

impl<O: ?Sized, T> fmt::Debug for LazyOwnedCollection<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.collection.get() {
            Some(collection) => fmt::Debug::fmt(collection, f),
            None => f.write_str("LazyOwnedCollection(<pending>)"),
        }
    }
}
