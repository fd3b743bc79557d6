//! Callbacks invoked from interrupt context.
//!
//! A callback is a `'static` closure reference. Captured state replaces the
//! untyped context pointer such APIs usually carry; the closure itself must be
//! `Sync` since it is reached from interrupt handlers.

use core::{cell::Cell, marker::PhantomData};

use critical_section::Mutex;

use crate::error::Error;

/// User function run when an interval elapses or an interrupt line fires.
///
/// It runs with interrupts masked and must return quickly.
pub type Callback = &'static (dyn Fn() + Sync);

/// A single callback slot.
pub struct CallbackCell {
    callback: Mutex<Cell<Option<Callback>>>,
}

impl CallbackCell {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callback: Mutex::new(Cell::new(None)),
        }
    }

    /// Store `callback`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// [`Error::NullCallback`] if `callback` is `None`. The slot keeps its
    /// previous value.
    pub fn register(&self, callback: Option<Callback>) -> Result<(), Error> {
        let callback = callback.ok_or(Error::NullCallback)?;
        critical_section::with(|cs| self.callback.borrow(cs).set(Some(callback)));
        Ok(())
    }

    /// Remove the stored callback.
    pub fn clear(&self) {
        critical_section::with(|cs| self.callback.borrow(cs).set(None));
    }

    /// The stored callback, if any.
    pub fn get(&self) -> Option<Callback> {
        critical_section::with(|cs| self.callback.borrow(cs).get())
    }

    /// Run the stored callback. Does nothing when the slot is empty.
    ///
    /// Returns whether a callback ran.
    pub fn invoke(&self) -> bool {
        // Looked up under the lock, called outside of it.
        match self.get() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Default for CallbackCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one slot of a [`CallbackTable`].
pub trait Line: Copy {
    /// Slot index, below the table size.
    fn index(self) -> usize;
}

/// Callbacks indexed by a strongly typed interrupt source.
pub struct CallbackTable<L, const N: usize> {
    cells: [CallbackCell; N],
    _line: PhantomData<fn(L)>,
}

impl<L: Line, const N: usize> CallbackTable<L, N> {
    /// A table with every slot empty.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [const { CallbackCell::new() }; N],
            _line: PhantomData,
        }
    }

    /// Store `callback` for `line`. Last writer wins.
    ///
    /// # Errors
    ///
    /// [`Error::NullCallback`] if `callback` is `None`.
    pub fn register(&self, line: L, callback: Option<Callback>) -> Result<(), Error> {
        self.cells[line.index()].register(callback)
    }

    /// Remove the callback for `line`.
    pub fn clear(&self, line: L) {
        self.cells[line.index()].clear();
    }

    /// Whether `line` has a callback.
    pub fn is_registered(&self, line: L) -> bool {
        self.cells[line.index()].get().is_some()
    }

    /// Run the callback for `line`, if any.
    pub fn invoke(&self, line: L) -> bool {
        self.cells[line.index()].invoke()
    }
}

impl<L: Line, const N: usize> Default for CallbackTable<L, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::{CallbackCell, CallbackTable, Line};
    use crate::error::Error;

    static FIRST: AtomicU32 = AtomicU32::new(0);
    static SECOND: AtomicU32 = AtomicU32::new(0);
    static HITS: AtomicU32 = AtomicU32::new(0);

    fn first() {
        FIRST.fetch_add(1, Ordering::Relaxed);
    }

    fn second() {
        SECOND.fetch_add(1, Ordering::Relaxed);
    }

    fn hit() {
        HITS.fetch_add(1, Ordering::Relaxed);
    }

    #[derive(Clone, Copy)]
    enum Pin {
        A,
        B,
    }

    impl Line for Pin {
        fn index(self) -> usize {
            self as usize
        }
    }

    #[test]
    fn empty_slot_is_a_no_op() {
        let cell = CallbackCell::new();
        assert!(cell.get().is_none());
        assert!(!cell.invoke());
    }

    #[test]
    fn rejects_missing_callback() {
        let cell = CallbackCell::new();

        assert_eq!(cell.register(None), Err(Error::NullCallback));
        assert!(cell.get().is_none());

        cell.register(Some(&hit)).unwrap();
        assert_eq!(cell.register(None), Err(Error::NullCallback));
        assert!(cell.invoke());
        assert_eq!(HITS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn last_writer_wins() {
        let table: CallbackTable<Pin, 2> = CallbackTable::new();

        table.register(Pin::A, Some(&first)).unwrap();
        table.register(Pin::A, Some(&second)).unwrap();

        assert!(table.invoke(Pin::A));
        assert!(!table.invoke(Pin::B));
        assert_eq!(FIRST.load(Ordering::Relaxed), 0);
        assert_eq!(SECOND.load(Ordering::Relaxed), 1);

        table.clear(Pin::A);
        assert!(!table.is_registered(Pin::A));
        assert!(!table.invoke(Pin::A));
        assert_eq!(SECOND.load(Ordering::Relaxed), 1);
    }
}
