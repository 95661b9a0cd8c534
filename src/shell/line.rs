use core::ops::Deref;

use heapless::Vec;

use crate::driver::Console;

// visible characters per line; the C-style terminator is implicit.
pub const LINE_MAX: usize = 31;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;

/// One line of shell input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Line(Vec<u8, LINE_MAX>);

impl Line {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Line {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Read a line, polling until CR or LF, or until the buffer is full.
/// Backspace and delete drop the last buffered byte; 0 means "no data"
/// and is skipped. Nothing is echoed except the final newline.
pub fn read_line<C: Console>(console: &mut C) -> Line {
    let mut line = Line::default();
    while !line.0.is_full() {
        match console.getc() {
            0 => continue,
            BACKSPACE | DELETE => {
                line.0.pop();
            }
            b'\n' | b'\r' => break,
            c => {
                // cannot fail: the loop stops when full
                let _ = line.0.push(c);
            }
        }
    }
    console.putc(b'\n');
    line
}
