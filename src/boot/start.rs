//=================================
// jump from entry.S, in machine mode, on hart 0 only.

use riscv::register;
use riscv::register::mtvec::TrapMode;

use crate::arch::{config_pm_protection, hart_id};
use crate::kmain;
use crate::trap::kernelvec;

#[no_mangle]
extern "C" fn start() -> ! {
    // the kernel never leaves machine mode and never turns on paging;
    // only user programs run at a lower privilege.

    // configure Physical Memory Protection so that user mode
    // may touch all of physical memory.
    config_pm_protection();

    // kernel traps go to kernelvec until a user program is entered.
    unsafe {
        register::mtvec::write(kernelvec as usize, TrapMode::Direct);
    }

    debug_assert_eq!(hart_id(), 0);
    kmain()
}
