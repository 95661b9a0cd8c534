//! Flat file table reader.
//!
//! The disk image is the kernel, padded to `KERNEL_SIZE`, followed by a
//! little-endian `u32` entry count and then the entries, 40 bytes each:
//!
//! ```text
//! +----------------------+------------+----------+
//! | name (32, NUL-padded)| offset u32 | size u32 |
//! +----------------------+------------+----------+
//! ```
//!
//! Offsets are measured from the start of the image. The table is
//! read-only; nothing here ever writes to the disk.

use core::fmt;
use core::str;

use thiserror::Error;

use crate::memory::layout::KERNEL_SIZE;

pub const NAME_LEN: usize = 32;
pub const ENTRY_SIZE: usize = NAME_LEN + 4 + 4;
pub const COUNT_SIZE: usize = 4;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SfsError {
    #[error("file table truncated ({count} entries do not fit in the image)")]
    TableTruncated { count: u32 },
    #[error("file extends past the end of the image ({offset:#x}+{size})")]
    OutOfBounds { offset: u32, size: u32 },
    #[error("destination holds {capacity} bytes, file needs {size}")]
    DestinationTooSmall { size: u32, capacity: usize },
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    name: [u8; NAME_LEN],
    offset: u32,
    size: u32,
}

impl FileEntry {
    pub fn new(name: &[u8], offset: u32, size: u32) -> Self {
        let mut raw = [0u8; NAME_LEN];
        let len = name.len().min(NAME_LEN - 1);
        raw[..len].copy_from_slice(&name[..len]);
        Self {
            name: raw,
            offset,
            size,
        }
    }

    fn parse(raw: &[u8]) -> Self {
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&raw[..NAME_LEN]);
        Self {
            name,
            offset: read_u32(raw, NAME_LEN),
            size: read_u32(raw, NAME_LEN + 4),
        }
    }

    pub fn encode(&self) -> [u8; ENTRY_SIZE] {
        let mut raw = [0u8; ENTRY_SIZE];
        raw[..NAME_LEN].copy_from_slice(&self.name);
        raw[NAME_LEN..NAME_LEN + 4].copy_from_slice(&self.offset.to_le_bytes());
        raw[NAME_LEN + 4..].copy_from_slice(&self.size.to_le_bytes());
        raw
    }

    // up to the first NUL
    pub fn name_bytes(&self) -> &[u8] {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        &self.name[..len]
    }

    pub fn name(&self) -> &str {
        str::from_utf8(self.name_bytes()).unwrap_or("?")
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

impl fmt::Debug for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEntry")
            .field("name", &self.name())
            .field("offset", &self.offset)
            .field("size", &self.size)
            .finish()
    }
}

#[derive(Clone, Copy)]
pub struct Sfs<'a> {
    disk: &'a [u8],
    // byte offset of the first entry
    table: usize,
    count: u32,
}

impl<'a> Sfs<'a> {
    // the table starts `kernel_size` bytes into `disk`; every record must
    // lie inside the image.
    pub fn new(disk: &'a [u8], kernel_size: usize) -> Result<Self, SfsError> {
        let count = disk
            .get(kernel_size..kernel_size + COUNT_SIZE)
            .map(|raw| read_u32(raw, 0))
            .ok_or(SfsError::TableTruncated { count: 0 })?;
        let table = kernel_size + COUNT_SIZE;
        let fits = (count as usize)
            .checked_mul(ENTRY_SIZE)
            .and_then(|len| table.checked_add(len))
            .is_some_and(|end| end <= disk.len());
        if !fits {
            return Err(SfsError::TableTruncated { count });
        }
        Ok(Self { disk, table, count })
    }

    pub fn mount(disk: &'a [u8]) -> Result<Self, SfsError> {
        Self::new(disk, KERNEL_SIZE)
    }

    pub const fn empty() -> Self {
        Self {
            disk: &[],
            table: 0,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn list(&self) -> Entries<'a> {
        Entries { sfs: *self, next: 0 }
    }

    /// First entry whose name equals `name` byte for byte.
    pub fn find(&self, name: &[u8]) -> Option<FileEntry> {
        self.list().find(|e| e.name_bytes() == name)
    }

    /// Copy the contents of `entry` to the front of `dst`; the rest of
    /// `dst` is left untouched.
    pub fn load(&self, entry: &FileEntry, dst: &mut [u8]) -> Result<usize, SfsError> {
        let size = entry.size as usize;
        let start = entry.offset as usize;
        let src = start
            .checked_add(size)
            .and_then(|end| self.disk.get(start..end))
            .ok_or(SfsError::OutOfBounds {
                offset: entry.offset,
                size: entry.size,
            })?;
        if dst.len() < size {
            return Err(SfsError::DestinationTooSmall {
                size: entry.size,
                capacity: dst.len(),
            });
        }
        dst[..size].copy_from_slice(src);
        Ok(size)
    }

    fn entry(&self, index: u32) -> FileEntry {
        let at = self.table + index as usize * ENTRY_SIZE;
        FileEntry::parse(&self.disk[at..at + ENTRY_SIZE])
    }
}

pub struct Entries<'a> {
    sfs: Sfs<'a>,
    next: u32,
}

impl Iterator for Entries<'_> {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        if self.next >= self.sfs.count {
            return None;
        }
        let entry = self.sfs.entry(self.next);
        self.next += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.sfs.count - self.next) as usize;
        (left, Some(left))
    }
}

fn read_u32(raw: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&raw[at..at + 4]);
    u32::from_le_bytes(b)
}
