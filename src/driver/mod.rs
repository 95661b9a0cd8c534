use core::fmt;

pub mod uart;

// synchronous byte channel the shell talks through
pub trait Console: fmt::Write {
    fn putc(&mut self, c: u8);

    /// Next received byte, or 0 when nothing is pending.
    fn getc(&mut self) -> u8;

    fn puts(&mut self, bytes: &[u8]) {
        for &c in bytes {
            self.putc(c);
        }
    }

    // console writes never fail
    fn print(&mut self, args: fmt::Arguments) {
        let _ = self.write_fmt(args);
    }
}
