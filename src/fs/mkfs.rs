//! Offline disk image builder.
//!
//! Produces the layout that [`Sfs`](super::sfs::Sfs) reads: the kernel
//! padded to a fixed size, the entry count, the entries, then the file
//! contents back to back.

use log::warn;
use thiserror::Error;

use super::sfs::{FileEntry, COUNT_SIZE, ENTRY_SIZE, NAME_LEN};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MkfsError {
    #[error("image is {0} bytes; offsets must fit in 32 bits")]
    ImageTooLarge(usize),
}

/// Name a program file is listed under: the file name with every `.bin`
/// removed, cut to 31 bytes.
pub fn program_name(file_name: &str) -> Vec<u8> {
    let mut name = file_name.replace(".bin", "").into_bytes();
    name.truncate(NAME_LEN - 1);
    name
}

pub struct ImageBuilder {
    kernel_size: usize,
    kernel: Vec<u8>,
    files: Vec<(Vec<u8>, Vec<u8>)>,
}

impl ImageBuilder {
    pub fn new(kernel_size: usize) -> Self {
        Self {
            kernel_size,
            kernel: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Set the kernel image. Anything past `kernel_size` is dropped.
    pub fn kernel(&mut self, image: &[u8]) -> &mut Self {
        if image.len() > self.kernel_size {
            warn!(
                "kernel too big ({} > {}), truncating",
                image.len(),
                self.kernel_size
            );
        }
        let keep = image.len().min(self.kernel_size);
        self.kernel = image[..keep].to_vec();
        self
    }

    /// Append a file. Names are not checked for uniqueness.
    pub fn file(&mut self, name: &[u8], content: &[u8]) -> &mut Self {
        let len = name.len().min(NAME_LEN - 1);
        self.files.push((name[..len].to_vec(), content.to_vec()));
        self
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn build(&self) -> Result<Vec<u8>, MkfsError> {
        let header = self.kernel_size + COUNT_SIZE + self.files.len() * ENTRY_SIZE;
        let total = header + self.files.iter().map(|(_, c)| c.len()).sum::<usize>();
        if u32::try_from(total).is_err() {
            return Err(MkfsError::ImageTooLarge(total));
        }

        let mut disk = Vec::with_capacity(total);
        disk.extend_from_slice(&self.kernel);
        disk.resize(self.kernel_size, 0);
        disk.extend_from_slice(&(self.files.len() as u32).to_le_bytes());

        let mut offset = header;
        for (name, content) in &self.files {
            let entry = FileEntry::new(name, offset as u32, content.len() as u32);
            disk.extend_from_slice(&entry.encode());
            offset += content.len();
        }
        for (_, content) in &self.files {
            disk.extend_from_slice(content);
        }
        Ok(disk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::sfs::Sfs;

    #[test]
    fn program_names_drop_the_extension() {
        assert_eq!(program_name("hello.bin"), b"hello");
        assert_eq!(program_name("a.bin.bin"), b"a");
        assert_eq!(program_name("readme"), b"readme");
        let long = format!("{}.bin", "m".repeat(40));
        assert_eq!(program_name(&long).len(), 31);
    }

    #[test]
    fn kernel_is_padded_then_table_follows() {
        let disk = ImageBuilder::new(64)
            .kernel(&[0x13; 10])
            .file(b"hello", b"HELLO")
            .file(b"mandelbrot", &[7; 300])
            .build()
            .unwrap();

        assert_eq!(&disk[..10], &[0x13; 10]);
        assert!(disk[10..64].iter().all(|&b| b == 0));
        assert_eq!(&disk[64..68], &2u32.to_le_bytes());
        assert_eq!(disk.len(), 64 + 4 + 2 * 40 + 5 + 300);

        let sfs = Sfs::new(&disk, 64).unwrap();
        let hello = sfs.find(b"hello").unwrap();
        assert_eq!(hello.offset() as usize, 64 + 4 + 80);
        let mandel = sfs.find(b"mandelbrot").unwrap();
        assert_eq!(mandel.offset(), hello.offset() + 5);

        let mut buf = [0u8; 5];
        sfs.load(&hello, &mut buf).unwrap();
        assert_eq!(&buf, b"HELLO");
    }

    #[test]
    fn oversized_kernel_is_truncated() {
        let disk = ImageBuilder::new(8).kernel(&[1; 20]).build().unwrap();
        assert_eq!(disk.len(), 8 + 4);
        assert_eq!(&disk[8..], &0u32.to_le_bytes());
    }

    #[test]
    fn empty_directory_gives_an_empty_table() {
        let disk = ImageBuilder::new(16).build().unwrap();
        let sfs = Sfs::new(&disk, 16).unwrap();
        assert!(sfs.is_empty());
    }
}
