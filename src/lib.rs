//! Core of a single-core rv64 teaching kernel: a page frame allocator, a
//! read-only flat file table, and a shell that loads programs from the
//! table and runs them in user mode.
//!
//! Everything here is independent of the hardware and runs under host
//! `cargo test`; the kernel binary (`src/main.rs`) adds boot code, trap
//! vectors and the user-mode transition.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod address;
pub mod driver;
pub mod fs;
pub mod logging;
pub mod memory;
pub mod process;
pub mod shell;
pub mod syscall;
