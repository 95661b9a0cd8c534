use log::{debug, info};
use thiserror::Error;

use super::{Executor, Outcome};
use crate::address::Addr;
use crate::fs::{FileEntry, Sfs, SfsError};
use crate::memory::kalloc::Kalloc;
use crate::memory::layout::PGSIZE;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error("out of memory")]
    OutOfFrames,
    #[error("image too large ({size} > {capacity} bytes)")]
    TooLarge { size: u32, capacity: usize },
    #[error(transparent)]
    Fs(#[from] SfsError),
}

// owner of the user program window
pub struct Loader<'a> {
    base: Addr,
    region: &'a mut [u8],
}

impl<'a> Loader<'a> {
    // `region` backs the window that programs are linked to run at, `base`.
    pub fn new(base: Addr, region: &'a mut [u8]) -> Self {
        Self { base, region }
    }

    pub fn region(&self) -> &[u8] {
        &self.region[..]
    }

    /// Wipe the window, then copy `entry` to its start.
    pub fn load(&mut self, sfs: &Sfs, entry: &FileEntry) -> Result<(), LoadError> {
        self.region.fill(0);
        if entry.size() as usize > self.region.len() {
            return Err(LoadError::TooLarge {
                size: entry.size(),
                capacity: self.region.len(),
            });
        }
        sfs.load(entry, self.region)?;
        debug!(
            "loaded {} ({} bytes) at {:#x}",
            entry.name(),
            entry.size(),
            self.base
        );
        Ok(())
    }

    /// Load `entry` and run it on a fresh stack frame until it exits or
    /// faults. The stack frame goes back to the pool afterwards.
    pub fn exec<E: Executor>(
        &mut self,
        sfs: &Sfs,
        kalloc: &mut Kalloc,
        executor: &mut E,
        entry: &FileEntry,
    ) -> Result<Outcome, LoadError> {
        let stack = kalloc.alloc().ok_or(LoadError::OutOfFrames)?;
        if let Err(e) = self.load(sfs, entry) {
            kalloc.free(stack);
            return Err(e);
        }

        let raw = executor.enter(self.base, stack + PGSIZE);
        kalloc.free(stack);

        let outcome = Outcome::from_raw(raw);
        match outcome {
            Outcome::Exited(code) => debug!("{} exited with {}", entry.name(), code),
            Outcome::Faulted(cause) => info!("{} faulted, cause {:#x}", entry.name(), cause),
        }
        Ok(outcome)
    }
}
