// one program at a time: copied into the user window, entered in user
// mode, and the kernel waits until it traps back.

pub mod loader;

pub use loader::{LoadError, Loader};

use crate::address::Addr;

// or'ed into trap causes; faults never look like exit codes
pub const FAULT_TAG: u64 = 1 << 63;

/// Privilege transition into user code. Blocks until the program gives
/// the cpu back; 0..=255 is an exit code, anything else a fault cause.
pub trait Executor {
    fn enter(&mut self, entry: Addr, stack_top: Addr) -> i64;
}

/// How a program gave the cpu back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exited(u8),
    Faulted(u64),
}

impl Outcome {
    pub fn from_raw(raw: i64) -> Self {
        match u8::try_from(raw) {
            Ok(code) => Outcome::Exited(code),
            Err(_) => Outcome::Faulted(raw as u64),
        }
    }
}

pub fn fault_code(cause: usize) -> i64 {
    (FAULT_TAG | cause as u64) as i64
}
