//! Error types for the `swiss-tbl` crate

use core::alloc::Layout;

/// Errors raised while growing a [`SwissTable`](crate::SwissTable).
///
/// A failed growth leaves the table exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested capacity does not fit in `usize`, or its allocation
    /// size exceeds `isize::MAX` bytes.
    #[error("hash table capacity overflow")]
    CapacityOverflow,

    /// The allocator could not satisfy a request for the control or entry
    /// array.
    #[error("failed to allocate {} bytes of hash table storage", .layout.size())]
    AllocError {
        /// Layout of the rejected allocation.
        layout: Layout,
    },
}

impl Error {
    /// Escalates the error the way infallible collection APIs do: abort
    /// through the allocation error handler, or panic on overflow.
    #[cold]
    pub(crate) fn escalate(self) -> ! {
        match self {
            Error::CapacityOverflow => panic!("hash table capacity overflow"),
            Error::AllocError { layout } => alloc::alloc::handle_alloc_error(layout),
        }
    }
}
