// System calls a user program can make with `ecall`.
// The call number is in a7, arguments start at a0.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysCall {
    // exit(code): give the cpu back to the shell
    Exit,
}

pub const SYS_EXIT: usize = 93;

impl SysCall {
    pub fn from_id(a7: usize) -> Option<SysCall> {
        match a7 {
            SYS_EXIT => Some(SysCall::Exit),
            _ => None,
        }
    }

    pub fn id(self) -> usize {
        match self {
            SysCall::Exit => SYS_EXIT,
        }
    }
}
