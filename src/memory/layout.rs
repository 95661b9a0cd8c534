// Physical memory layout

// the emulated rv64 machine is set up like this:
//
// 10000000 -- uart0 (single transmit/receive byte register)
// 80000000 -- kernel is loaded here, text first
// 80200000 -- user program window (1 MiB)
// 90000000 -- virtual disk, the image written by mkfs
//
// the kernel uses physical memory thus:
// 80000000 -- entry.S, then kernel text, data and boot stack
// _kernel_end -- end of the kernel image (defined by kernel.ld)
// USER_BASE .. USER_END -- the single loaded program
// max(_kernel_end, USER_END) -- start of the frame pool
// PHYSTOP -- end of RAM

use crate::address::Addr;

pub const PGSIZE: usize = 4096;

// uart registers live here in physical memory.
pub const UART0: Addr = Addr(0x1000_0000);

// the kernel expects there to be RAM
// for use by the kernel and user programs
// from physical address 0x80000000 to PHYSTOP.
pub const KERNBASE: Addr = Addr(0x8000_0000);
pub const RAM_SIZE: usize = 128 * 1024 * 1024;
pub const PHYSTOP: Addr = Addr(KERNBASE.0 + RAM_SIZE);

// user programs are linked to run here.
pub const USER_BASE: Addr = Addr(0x8020_0000);
pub const USER_REGION_SIZE: usize = 0x10_0000;
pub const USER_END: Addr = Addr(USER_BASE.0 + USER_REGION_SIZE);

// disk image, memory mapped read-only.
pub const DISK_BASE: Addr = Addr(0x9000_0000);
// 8-byte little-endian length of the attached image.
pub const DISK_SIZE_REG: Addr = Addr(DISK_BASE.0 + 0xFF8);

// bytes reserved for the kernel at the front of the disk image.
// must match mkfs.
pub const KERNEL_SIZE: usize = 65536;

/// First address the frame pool may hand out, given where the linker
/// ended the kernel image. Frames never alias the user program window.
pub fn pool_start(kernel_end: Addr) -> Addr {
    if kernel_end < USER_END {
        USER_END
    } else {
        kernel_end
    }
}
