use riscv::register::mcause::{self, Exception, Trap};
use riscv::register::mtvec::{self, TrapMode};
use riscv::register::{mepc, mtval};

use rvmk::address::Addr;
use rvmk::process::{fault_code, Executor};
use rvmk::syscall::SysCall;

use crate::arch::{self, fence_i};

extern "C" {
    pub(crate) fn kernelvec();
    fn switch_to_user(entry: usize, stack_top: usize) -> i64;
}

/// Runs user programs with `mret`, in user mode.
pub(crate) struct UserMode;

impl Executor for UserMode {
    fn enter(&mut self, entry: Addr, stack_top: Addr) -> i64 {
        // the program was just written through the data side.
        fence_i();
        let raw = unsafe { switch_to_user(entry.0, stack_top.0) };
        // back from uservec: kernel traps go to kernelvec again.
        unsafe {
            mtvec::write(kernelvec as usize, TrapMode::Direct);
        }
        raw
    }
}

// Called by uservec, on the kernel stack, for every trap out of user mode.
// a0 and a7 are the user's registers at the time of the trap.
// Returns what switch_to_user returns.
#[no_mangle]
extern "C" fn user_trap(a0: usize, a7: usize) -> i64 {
    let cause = mcause::read();
    match cause.cause() {
        Trap::Exception(Exception::UserEnvCall) => match SysCall::from_id(a7) {
            Some(SysCall::Exit) => return a0 as i64,
            None => log::warn!("unknown syscall {}", a7),
        },
        t => log::debug!(
            "user trap {:?} at {:#x}, mtval {:#x}",
            t,
            mepc::read(),
            mtval::read()
        ),
    }
    fault_code(cause.bits())
}

// Called by kernelvec. Kernel traps do not return.
#[no_mangle]
extern "C" fn kernel_trap() -> ! {
    match mcause::read().cause() {
        // shutdown() came back through its own ecall.
        Trap::Exception(Exception::MachineEnvCall) => arch::halt(),
        t => panic!(
            "kernel trap {:?} at {:#x}, mtval {:#x}",
            t,
            mepc::read(),
            mtval::read()
        ),
    }
}
