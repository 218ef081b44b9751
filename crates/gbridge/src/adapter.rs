//! The reference-count adapter.
//!
//! All calls to the runtime's reference primitives go through [`RefAdapter`]. The
//! adapter performs exactly one reference operation per acquisition and exactly
//! one per release, which keeps each wrapper's contribution to the native count
//! at one for its whole lifetime.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{handle::RawHandle, native::NativeRuntime};

/// How a binding site acquires the object a native call handed back.
///
/// Each binding site has a fixed mode chosen from the native function's
/// documented transfer semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Ownership {
    /// The call returned a possibly floating reference (constructors of
    /// initially-unowned types). The wrapper sinks it, taking ownership of the
    /// floating reference instead of adding one.
    Sink,
    /// The call transferred a full reference. The wrapper adopts it as is.
    Full,
    /// The call returned a pointer owned by someone else. The wrapper adds its
    /// own reference.
    Borrowed,
}

#[derive(Clone, Copy)]
pub(crate) struct RefAdapter<'a> {
    runtime: &'a dyn NativeRuntime,
}

impl<'a> RefAdapter<'a> {
    pub(crate) fn new(runtime: &'a dyn NativeRuntime) -> Self {
        Self { runtime }
    }

    /// Acquires the single reference a new wrapper holds on `handle`.
    pub(crate) fn acquire(self, handle: RawHandle, ownership: Ownership) {
        match ownership {
            Ownership::Sink => {
                trace!(%handle, "ref_sink");
                self.runtime.ref_sink(handle);
            }
            Ownership::Full => trace!(%handle, "adopt full reference"),
            Ownership::Borrowed => {
                trace!(%handle, "inc_ref");
                self.runtime.inc_ref(handle);
            }
        }
    }

    /// Releases the reference acquired by [`acquire`](Self::acquire).
    pub(crate) fn release(self, handle: RawHandle) {
        trace!(%handle, "dec_ref");
        self.runtime.dec_ref(handle);
    }
}
