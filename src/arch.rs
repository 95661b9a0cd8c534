use core::arch::asm;
use riscv::register;

use rvmk::syscall::SysCall;

// give every privilege mode access to all of physical memory,
// so user programs can reach the uart without a syscall.
pub(crate) fn config_pm_protection() {
    register::pmpaddr0::write(0x3fffffffffffff);
    register::pmpcfg0::write(0xf);
}

pub(crate) fn hart_id() -> usize {
    register::mhartid::read()
}

pub(crate) fn wfi() {
    unsafe {
        asm!("wfi");
    }
}

pub(crate) fn fence_i() {
    unsafe {
        asm!("fence.i");
    }
}

pub(crate) fn halt() -> ! {
    loop {
        wfi();
    }
}

// ask the platform to power off. the emulator treats exit(0) from
// machine mode as shutdown; if it comes back anyway, park the hart.
pub(crate) fn shutdown() -> ! {
    unsafe {
        asm!("ecall", in("a7") SysCall::Exit.id(), in("a0") 0usize);
    }
    halt()
}
