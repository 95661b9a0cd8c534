use core::fmt;
use core::ops::{Add, Sub};

use crate::memory::layout::PGSIZE;

// a physical address
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct Addr(pub usize);

impl Add<usize> for Addr {
    type Output = Self;
    fn add(self, rhs: usize) -> Self::Output {
        Addr(self.0 + rhs)
    }
}

impl Sub<usize> for Addr {
    type Output = Self;
    fn sub(self, rhs: usize) -> Self::Output {
        Addr(self.0 - rhs)
    }
}

// distance in bytes between two addresses
impl Sub<Addr> for Addr {
    type Output = usize;
    fn sub(self, rhs: Addr) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::LowerHex for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Addr {
    pub const fn round_up_pg(self) -> Self {
        Self((self.0 + PGSIZE - 1) & !(PGSIZE - 1))
    }

    pub const fn is_page_aligned(self) -> bool {
        self.0 & (PGSIZE - 1) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_page_boundaries() {
        assert_eq!(Addr(0x8000_0000).round_up_pg(), Addr(0x8000_0000));
        assert_eq!(Addr(0x8000_0001).round_up_pg(), Addr(0x8000_1000));
        assert!(Addr(0x8000_2000).is_page_aligned());
        assert!(!Addr(0x8000_2008).is_page_aligned());
    }

    #[test]
    fn address_difference_is_a_byte_count() {
        assert_eq!(Addr(0x8000_3000) - Addr(0x8000_1000), 0x2000);
        assert_eq!(Addr(0x8000_1000) + 0x10 - 0x8, Addr(0x8000_1008));
    }
}
