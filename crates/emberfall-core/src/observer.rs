//! Observer lists for broadcast notifications.
//!
//! An [`ObserverList`] holds callbacks and delivers each notification to all
//! of them in registration order. Every call to [`ObserverList::notify`]
//! reaches every subscribed observer exactly once.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use emberfall_core::observer::ObserverList;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let mut list = ObserverList::new();
//!
//! let sink = Rc::clone(&seen);
//! list.subscribe(move |value: &u32| sink.borrow_mut().push(*value));
//!
//! list.notify(&7);
//! assert_eq!(*seen.borrow(), vec![7]);
//! ```

use std::fmt;

/// Handle returned by [`ObserverList::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

/// Ordered list of callbacks receiving `&T`.
pub struct ObserverList<T> {
    next_id: u64,
    observers: Vec<(ObserverId, Callback<T>)>,
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &format!("[{} observers]", self.observers.len()))
            .finish()
    }
}

impl<T> ObserverList<T> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
        }
    }

    /// Appends an observer. It is notified after every observer already
    /// subscribed.
    pub fn subscribe(&mut self, observer: impl FnMut(&T) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Delivers `value` to every observer in registration order.
    pub fn notify(&mut self, value: &T) {
        for (_, observer) in &mut self.observers {
            observer(value);
        }
    }

    /// Number of subscribed observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
