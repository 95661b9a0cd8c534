// Physical memory allocator for whatever the kernel needs a page for
// (today: user stacks). Allocates whole 4096-byte pages.
//
// The pool is a singly linked free list threaded through the free
// frames themselves: the first eight bytes of a free frame hold the
// next free frame's offset from `start` plus one (little-endian, 0 ends
// the list), so a frame at address 0 still links.

use log::{error, info, warn};

use super::layout::PGSIZE;
use crate::address::Addr;

// byte written over freed frames to catch dangling refs.
pub const JUNK: u8 = 1;

const LINK_SIZE: usize = core::mem::size_of::<u64>();

pub struct Kalloc<'a> {
    // backing memory for [start, start + mem.len())
    mem: &'a mut [u8],
    start: Addr,
    // managed frames: [first, end)
    first: Addr,
    end: Addr,
    head: Option<Addr>,
    nfree: usize,
}

impl<'a> Kalloc<'a> {
    // `mem` backs physical memory from `start` (normally the end of the
    // kernel image). every whole page in it goes into the pool.
    pub fn new(start: Addr, mem: &'a mut [u8]) -> Self {
        let first = start.round_up_pg();
        let limit = start + mem.len();
        let mut kalloc = Self {
            mem,
            start,
            first,
            end: first,
            head: None,
            nfree: 0,
        };
        kalloc.free_range(first, limit);
        if kalloc.nfree == 0 {
            warn!("kalloc: no whole page in [{:#x}, {:#x})", start, limit);
        } else {
            info!(
                "kalloc: {} frames free in [{:#x}, {:#x})",
                kalloc.nfree, kalloc.first, kalloc.end
            );
        }
        kalloc
    }

    // Insert every page in [pa_start, pa_end) into the pool, lowest first,
    // so the highest page is handed out first.
    fn free_range(&mut self, pa_start: Addr, pa_end: Addr) {
        let mut page = pa_start;
        while page.0 + PGSIZE <= pa_end.0 {
            self.push(page);
            page = page + PGSIZE;
        }
        self.end = page;
    }

    /// Allocate one 4096-byte page of physical memory, zeroed.
    /// Returns None once the pool is exhausted.
    pub fn alloc(&mut self) -> Option<Addr> {
        let Some(page) = self.head else {
            warn!("kalloc: out of frames");
            return None;
        };
        self.head = self.link(page);
        self.nfree -= 1;
        self.memset(page, 0);
        Some(page)
    }

    /// Free the page of physical memory at `pa`, which normally should have
    /// been returned by a call to alloc(). A misaligned or out-of-range
    /// address is logged and halts the kernel.
    pub fn free(&mut self, pa: Addr) {
        if !self.manages(pa) {
            error!("kalloc: invalid free {:#018x}", pa.0);
            panic!("kfree: invalid address {:#x}", pa.0);
        }
        // Fill with junk to catch dangling refs.
        self.memset(pa, JUNK);
        self.push(pa);
    }

    pub fn free_frames(&self) -> usize {
        self.nfree
    }

    pub fn manages(&self, pa: Addr) -> bool {
        pa.is_page_aligned() && pa >= self.first && pa < self.end
    }

    pub fn frame(&self, pa: Addr) -> Option<&[u8]> {
        if !self.manages(pa) {
            return None;
        }
        let off = pa - self.start;
        Some(&self.mem[off..off + PGSIZE])
    }

    pub fn frame_mut(&mut self, pa: Addr) -> Option<&mut [u8]> {
        if !self.manages(pa) {
            return None;
        }
        let off = pa - self.start;
        Some(&mut self.mem[off..off + PGSIZE])
    }

    fn push(&mut self, page: Addr) {
        let next = self.head.map_or(0, |a| (a - self.start + 1) as u64);
        let off = page - self.start;
        self.mem[off..off + LINK_SIZE].copy_from_slice(&next.to_le_bytes());
        self.head = Some(page);
        self.nfree += 1;
    }

    fn link(&self, page: Addr) -> Option<Addr> {
        let off = page - self.start;
        let mut raw = [0u8; LINK_SIZE];
        raw.copy_from_slice(&self.mem[off..off + LINK_SIZE]);
        match u64::from_le_bytes(raw) {
            0 => None,
            next => Some(self.start + (next as usize - 1)),
        }
    }

    fn memset(&mut self, page: Addr, val: u8) {
        let off = page - self.start;
        self.mem[off..off + PGSIZE].fill(val);
    }
}
