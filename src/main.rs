#![no_main]
#![no_std]

mod arch;
mod boot;
mod trap;

use core::panic::PanicInfo;
use core::ptr::{addr_of, read_volatile};
use core::slice;

use rvmk::address::Addr;
use rvmk::driver::uart::{Serial, UART};
use rvmk::fs::Sfs;
use rvmk::memory::kalloc::Kalloc;
use rvmk::memory::layout::{self, DISK_BASE, DISK_SIZE_REG, PHYSTOP, USER_BASE, USER_REGION_SIZE};
use rvmk::process::Loader;
use rvmk::shell::{self, Shell};
use rvmk::{logging, println};

extern "C" {
    // first address after the kernel, defined by kernel.ld.
    static _kernel_end: u8;
}

//====================================
#[panic_handler]
fn panic(info: &PanicInfo<'_>) -> ! {
    // whoever held the uart is never coming back
    unsafe { UART.force_unlock() };
    println!("\nkernel panic: {}", info);
    arch::halt()
}
//====================================
#[no_mangle]
extern "C" fn kmain() -> ! {
    logging::init();
    let mut console = Serial;
    shell::banner(&mut console);

    let kernel_end = Addr(unsafe { addr_of!(_kernel_end) as usize });
    let pool = layout::pool_start(kernel_end);
    let ram = unsafe { slice::from_raw_parts_mut(pool.0 as *mut u8, PHYSTOP - pool) };
    let kalloc = Kalloc::new(pool, ram);

    let disk_len = unsafe { read_volatile(DISK_SIZE_REG.0 as *const u64) } as usize;
    let disk = unsafe { slice::from_raw_parts(DISK_BASE.0 as *const u8, disk_len) };
    let sfs = Sfs::mount(disk).unwrap_or_else(|e| {
        log::error!("sfs: {}, no files available", e);
        Sfs::empty()
    });

    let window = unsafe { slice::from_raw_parts_mut(USER_BASE.0 as *mut u8, USER_REGION_SIZE) };
    let loader = Loader::new(USER_BASE, window);

    let mut sh = Shell::new(console, sfs, kalloc, loader, trap::UserMode);
    sh.run();

    arch::shutdown()
}
