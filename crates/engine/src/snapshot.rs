//! Versioned snapshots for data that is reloaded wholesale.
//!
//! Each load takes a [`LoadTicket`] before the request is sent. When the
//! response arrives it is committed only if no newer load has been started
//! since, so a slow response for a month the user already navigated away
//! from cannot overwrite the newer selection.

/// Issued when a load starts; identifies the load's position in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn version(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct Snapshots<T> {
    issued: u64,
    committed: Option<u64>,
    current: Option<T>,
}

impl<T> Default for Snapshots<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            committed: None,
            current: None,
        }
    }
}

impl<T> Snapshots<T> {
    /// Starts a new load. Every earlier ticket becomes stale.
    pub fn begin(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Replaces the current value if `ticket` is the newest one issued.
    ///
    /// Returns `false` (and drops `value`) for a superseded load.
    pub fn commit(&mut self, ticket: LoadTicket, value: T) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.current = Some(value);
        self.committed = Some(ticket.0);
        true
    }

    /// Settles the newest load without a value, e.g. after a failed
    /// request. The previous value is dropped so it is not shown under the
    /// new selection.
    pub fn abandon(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.current = None;
        self.committed = Some(ticket.0);
        true
    }

    pub fn is_latest(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.issued
    }

    /// A load has been started and has not been committed yet.
    pub fn is_loading(&self) -> bool {
        self.issued > 0 && self.committed != Some(self.issued)
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Version of the value returned by [`Snapshots::current`].
    pub fn version(&self) -> Option<u64> {
        self.committed
    }

    /// Drops the current value and invalidates every outstanding ticket.
    pub fn invalidate(&mut self) {
        self.issued += 1;
        self.committed = Some(self.issued);
        self.current = None;
    }
}
