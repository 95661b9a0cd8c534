// polled uart: a single byte-wide register. a store transmits, a load
// returns the next received byte or 0 when nothing is pending.

use core::fmt::{self, Write};
use core::ptr::{read_volatile, write_volatile};

use spin::Mutex;

use super::Console;
use crate::address::Addr;
use crate::memory::layout::UART0;

pub struct Uart {
    base: Addr,
}

impl Uart {
    /// # Safety
    /// `base` must be the address of the uart data register.
    pub const unsafe fn new(base: Addr) -> Self {
        Self { base }
    }

    pub fn putc(&mut self, c: u8) {
        unsafe { write_volatile(self.base.0 as *mut u8, c) }
    }

    pub fn getc(&mut self) -> u8 {
        unsafe { read_volatile(self.base.0 as *const u8) }
    }
}

impl fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.bytes() {
            self.putc(c);
        }
        Ok(())
    }
}

// shared by the console, the logger and the panic handler
pub static UART: Mutex<Uart> = Mutex::new(unsafe { Uart::new(UART0) });

// locks per call
#[derive(Clone, Copy, Default)]
pub struct Serial;

impl fmt::Write for Serial {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        UART.lock().write_str(s)
    }
}

impl Console for Serial {
    fn putc(&mut self, c: u8) {
        UART.lock().putc(c)
    }

    fn getc(&mut self) -> u8 {
        UART.lock().getc()
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    // the uart never reports errors
    let _ = UART.lock().write_fmt(args);
}

/// Prints formatted text to the uart.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::driver::uart::_print(format_args!($($arg)*))
    };
}

/// Prints formatted text to the uart, followed by a newline.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}
