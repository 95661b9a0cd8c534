// Read-only flat file table on the virtual disk, plus the host-side
// builder that lays the disk out.

#[cfg(any(test, feature = "std"))]
pub mod mkfs;
pub mod sfs;

pub use sfs::{FileEntry, Sfs, SfsError};
