use crossbeam::channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};

use crate::handle::RawHandle;

/// Where a dropped wrapper's native reference is released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReleasePolicy {
    /// Wrappers dropped on the toolkit thread release immediately; drops on any
    /// other thread are queued until the toolkit thread drains them.
    #[default]
    Immediate,
    /// Every release is queued, including those on the toolkit thread.
    Deferred,
}

/// Pending releases handed from arbitrary threads to the toolkit thread.
///
/// Each queued entry stands for exactly one reference owed to the native count.
#[derive(Debug)]
pub(crate) struct ReleaseQueue {
    tx: Sender<RawHandle>,
    rx: Receiver<RawHandle>,
}

impl ReleaseQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub(crate) fn push(&self, handle: RawHandle) {
        // the receiver lives in the same struct, so the channel cannot be disconnected
        let _ = self.tx.send(handle);
    }

    pub(crate) fn pop(&self) -> Option<RawHandle> {
        self.rx.try_recv().ok()
    }

    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let queue = ReleaseQueue::new();
        let a = RawHandle::from_addr(0x10).unwrap();
        let b = RawHandle::from_addr(0x20).unwrap();
        queue.push(a);
        queue.push(b);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(a));
        assert_eq!(queue.pop(), Some(b));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn policy_parses_kebab_case() {
        assert_eq!("deferred".parse::<ReleasePolicy>().unwrap(), ReleasePolicy::Deferred);
        assert_eq!(ReleasePolicy::Immediate.to_string(), "immediate");
    }
}
