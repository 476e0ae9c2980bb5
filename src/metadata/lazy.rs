//! Deferred field materialization.
//!
//! Every field of a backed entity is a [`LazyCell`]: it starts out holding a *source*, a
//! closure over the backing metadata that computes the value. The first read runs the source
//! and commits its result; every later read returns the committed value. Entities built in
//! memory start out with a value instead and never consult a source.
//!
//! Sources must be pure. Concurrent first reads may each run the source; the first result to
//! be committed wins and every caller observes it.
//!
//! # Examples
//!
//! ```rust
//! use dotmodel::metadata::lazy::LazyCell;
//!
//! let name = LazyCell::from_source(|| Ok("get_Value".to_string()));
//! assert!(!name.is_materialized());
//! assert_eq!(name.get()?, "get_Value");
//! assert!(name.is_materialized());
//!
//! name.set("set_Value".to_string());
//! assert_eq!(name.get()?, "set_Value");
//! # Ok::<(), dotmodel::Error>(())
//! ```

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use crate::Result;

/// A source computing the value of a [`LazyCell`] from backing storage.
pub type LazySource<T> = Arc<dyn Fn() -> Result<T> + Send + Sync>;

enum LazyState<T> {
    Value(T),
    Source(LazySource<T>),
}

/// A field that is either resolved, or resolvable on first access.
///
/// Once a value has been committed, whether computed or supplied through [`LazyCell::set`],
/// the source is gone for good.
pub struct LazyCell<T> {
    state: RwLock<LazyState<T>>,
}

impl<T: Clone> LazyCell<T> {
    /// Creates a cell that already holds `value`
    pub fn new(value: T) -> Self {
        LazyCell {
            state: RwLock::new(LazyState::Value(value)),
        }
    }

    /// Creates a cell that computes its value on first access
    pub fn from_source<F>(source: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        LazyCell {
            state: RwLock::new(LazyState::Source(Arc::new(source))),
        }
    }

    /// Returns the value, running the source if nothing has been committed yet.
    ///
    /// The source runs without any lock held. If another caller committed in the meantime,
    /// its value is returned and the freshly computed one is dropped.
    ///
    /// # Errors
    /// Propagates the error of a failing source. The failure is not committed; the next call
    /// consults the source again.
    pub fn get(&self) -> Result<T> {
        let source = {
            let state = read_lock!(self.state);
            match &*state {
                LazyState::Value(value) => return Ok(value.clone()),
                LazyState::Source(source) => Arc::clone(source),
            }
        };

        let computed = source()?;

        let mut state = write_lock!(self.state);
        match &*state {
            LazyState::Value(committed) => Ok(committed.clone()),
            LazyState::Source(_) => {
                *state = LazyState::Value(computed.clone());
                Ok(computed)
            }
        }
    }

    /// Replaces the value and discards the source
    pub fn set(&self, value: T) {
        *write_lock!(self.state) = LazyState::Value(value);
    }

    /// Returns true if a value has been committed
    pub fn is_materialized(&self) -> bool {
        matches!(&*read_lock!(self.state), LazyState::Value(_))
    }
}

impl<T: Clone + Default> Default for LazyCell<T> {
    fn default() -> Self {
        LazyCell::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*read_lock!(self.state) {
            LazyState::Value(value) => f.debug_tuple("LazyCell").field(value).finish(),
            LazyState::Source(_) => f.write_str("LazyCell(<pending>)"),
        }
    }
}
