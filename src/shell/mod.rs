//! The kernel's command shell. The only state kept between commands is
//! the last exit code, shown once in the next prompt.

pub mod line;

use log::debug;

use crate::driver::Console;
use crate::fs::{FileEntry, Sfs};
use crate::memory::kalloc::Kalloc;
use crate::process::{Executor, Loader, Outcome};

pub use line::{read_line, Line, LINE_MAX};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

// exit codes for a missing command, a trapped program, a failed load
pub const EXIT_NOT_FOUND: i64 = 127;
pub const EXIT_FAULT: i64 = 139;
pub const EXIT_CANNOT_EXEC: i64 = 126;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Ls,
    Help,
    Clear,
    Exit,
}

impl Builtin {
    pub fn parse(line: &[u8]) -> Option<Builtin> {
        match line {
            b"ls" => Some(Builtin::Ls),
            b"help" => Some(Builtin::Help),
            b"clear" => Some(Builtin::Clear),
            b"exit" => Some(Builtin::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Empty,
    Builtin(Builtin),
    Program(FileEntry),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

pub struct Shell<'a, C, E> {
    console: C,
    sfs: Sfs<'a>,
    kalloc: Kalloc<'a>,
    loader: Loader<'a>,
    executor: E,
    last_exit: i64,
}

impl<'a, C: Console, E: Executor> Shell<'a, C, E> {
    pub fn new(
        console: C,
        sfs: Sfs<'a>,
        kalloc: Kalloc<'a>,
        loader: Loader<'a>,
        executor: E,
    ) -> Self {
        Self {
            console,
            sfs,
            kalloc,
            loader,
            executor,
            last_exit: 0,
        }
    }

    /// Read and run commands until `exit`.
    pub fn run(&mut self) {
        while self.step() == Flow::Continue {}
    }

    pub fn step(&mut self) -> Flow {
        self.prompt();
        let line = read_line(&mut self.console);
        self.execute(&line)
    }

    pub fn prompt(&mut self) {
        self.console.print(format_args!("{GREEN}root@riscv{RESET}:{CYAN}~{RESET}"));
        if self.last_exit != 0 {
            self.console.print(format_args!("{RED} ({}){RESET}", self.last_exit));
            self.last_exit = 0;
        }
        self.console.puts(b"# ");
    }

    pub fn parse(&self, line: &[u8]) -> Command {
        if line.is_empty() {
            return Command::Empty;
        }
        if let Some(builtin) = Builtin::parse(line) {
            return Command::Builtin(builtin);
        }
        match self.sfs.find(line) {
            Some(entry) => Command::Program(entry),
            None => Command::NotFound,
        }
    }

    pub fn execute(&mut self, line: &[u8]) -> Flow {
        let command = self.parse(line);
        debug!("sh: {:?}", command);
        match command {
            Command::Empty => {}
            Command::Builtin(Builtin::Ls) => self.ls(),
            Command::Builtin(Builtin::Help) => {
                self.console.puts(b"Built-ins: ls, help, clear, exit\n");
            }
            Command::Builtin(Builtin::Clear) => {
                self.console.puts(CLEAR_SCREEN.as_bytes());
            }
            Command::Builtin(Builtin::Exit) => {
                self.console.print(format_args!("[ {GREEN}OK{RESET} ] System halting.\n"));
                return Flow::Halt;
            }
            Command::Program(entry) => self.run_program(&entry),
            Command::NotFound => {
                self.console.puts(b"sh: command not found: ");
                self.console.puts(line);
                self.console.putc(b'\n');
                self.last_exit = EXIT_NOT_FOUND;
            }
        }
        Flow::Continue
    }

    fn ls(&mut self) {
        self.console.puts(b"PERM   SIZE    NAME\n");
        self.console.puts(b"----   ----    ----\n");
        for entry in self.sfs.list() {
            self.console.print(format_args!("-r-x   {}    ", entry.size()));
            self.console.puts(entry.name_bytes());
            self.console.putc(b'\n');
        }
    }

    fn run_program(&mut self, entry: &FileEntry) {
        let result = self
            .loader
            .exec(&self.sfs, &mut self.kalloc, &mut self.executor, entry);
        self.last_exit = match result {
            Ok(Outcome::Exited(code)) => code.into(),
            Ok(Outcome::Faulted(cause)) => {
                self.console.print(format_args!(
                    "\n{RED}[FATAL] Trap Cause: {:#018x}{RESET}\n",
                    cause
                ));
                EXIT_FAULT
            }
            Err(e) => {
                self.console.print(format_args!("sh: {}: {}\n", entry.name(), e));
                EXIT_CANNOT_EXEC
            }
        };
    }

    /// Exit code the next prompt will show, 0 for none.
    pub fn last_exit(&self) -> i64 {
        self.last_exit
    }

    pub fn console(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn kalloc(&self) -> &Kalloc<'a> {
        &self.kalloc
    }

    pub fn loader(&self) -> &Loader<'a> {
        &self.loader
    }
}

pub fn banner<C: Console>(console: &mut C) {
    console.putc(b'\n');
    console.print(format_args!(
        "{CYAN}RISC-V MicroKernel v{}{RESET}\n",
        env!("CARGO_PKG_VERSION")
    ));
    console.print(format_args!("CPUs: 1 | RAM: 128MB | Arch: rv64\n\n"));
    status_ok(console, "Initializing UART...");
    status_ok(console, "Mounting Virtual Disk...");
    status_ok(console, "System Ready.\n");
}

fn status_ok<C: Console>(console: &mut C, what: &str) {
    console.print(format_args!("[ {GREEN}OK{RESET} ] {what}\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Addr;
    use crate::driver::mock::MockConsole;
    use crate::fs::mkfs::ImageBuilder;
    use crate::memory::layout::PGSIZE;
    use crate::process::fault_code;

    const KSIZE: usize = 64;
    const PROMPT: &str = "\x1b[32mroot@riscv\x1b[0m:\x1b[36m~\x1b[0m# ";

    // plays back one raw return value per program run
    struct Script(Vec<i64>);

    impl Executor for Script {
        fn enter(&mut self, _entry: Addr, _stack_top: Addr) -> i64 {
            self.0.remove(0)
        }
    }

    struct Rig {
        disk: Vec<u8>,
        region: Vec<u8>,
        ram: Vec<u8>,
    }

    impl Rig {
        fn new() -> Self {
            let disk = ImageBuilder::new(KSIZE)
                .file(b"hello", b"\x13\x00\x00\x00")
                .file(b"crash", b"\x00\x00\x00\x00\x00\x00")
                .build()
                .unwrap();
            Self {
                disk,
                region: vec![0xEE; 0x10_0000],
                ram: vec![0; 8 * PGSIZE],
            }
        }

        fn shell(&mut self, input: &[u8], script: &[i64]) -> Shell<'_, MockConsole, Script> {
            Shell::new(
                MockConsole::new(input),
                Sfs::new(&self.disk, KSIZE).unwrap(),
                Kalloc::new(Addr(0x8040_0000), &mut self.ram),
                Loader::new(Addr(0x8020_0000), &mut self.region),
                Script(script.to_vec()),
            )
        }
    }

    #[test]
    fn ls_is_stable_across_runs() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"ls\nls\n", &[]);
        sh.step();
        let first = sh.console().take_output();
        sh.step();
        let second = sh.console().take_output();
        assert_eq!(first, second);
        assert_eq!(
            first,
            format!(
                "{PROMPT}\nPERM   SIZE    NAME\n----   ----    ----\n\
                 -r-x   4    hello\n-r-x   6    crash\n"
            )
        );
    }

    #[test]
    fn exit_code_is_shown_once() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"hello\n\n\n", &[42]);
        assert_eq!(sh.step(), Flow::Continue);
        assert_eq!(sh.last_exit(), 42);
        sh.console().take_output();

        sh.step();
        let shown = sh.console().take_output();
        assert!(shown.contains("\x1b[31m (42)\x1b[0m# "));
        assert_eq!(sh.last_exit(), 0);

        sh.step();
        assert_eq!(sh.console().take_output(), format!("{PROMPT}\n"));
    }

    #[test]
    fn zero_exit_shows_nothing() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"hello\n\n", &[0]);
        sh.step();
        sh.console().take_output();
        sh.step();
        assert_eq!(sh.console().take_output(), format!("{PROMPT}\n"));
    }

    #[test]
    fn faults_print_the_cause_and_set_139() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"crash\n", &[fault_code(2)]);
        assert_eq!(sh.step(), Flow::Continue);
        assert_eq!(sh.last_exit(), EXIT_FAULT);
        let out = sh.console().take_output();
        assert!(out.contains("[FATAL] Trap Cause: 0x8000000000000002"));
        // kernel state is intact: the stack frame is back
        assert_eq!(sh.kalloc().free_frames(), 8);
    }

    #[test]
    fn out_of_range_exit_values_count_as_faults() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"hello\n", &[256]);
        sh.step();
        assert_eq!(sh.last_exit(), EXIT_FAULT);
        assert!(sh.console().take_output().contains("0x0000000000000100"));
    }

    #[test]
    fn unknown_names_set_127() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"vim\n", &[]);
        sh.step();
        assert_eq!(sh.last_exit(), EXIT_NOT_FOUND);
        assert_eq!(
            sh.console().take_output(),
            format!("{PROMPT}\nsh: command not found: vim\n")
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut rig = Rig::new();
        let sh = rig.shell(b"", &[]);
        assert!(matches!(sh.parse(b"hello"), Command::Program(_)));
        assert_eq!(sh.parse(b"HELLO"), Command::NotFound);
        assert_eq!(sh.parse(b"LS"), Command::NotFound);
    }

    #[test]
    fn empty_lines_just_prompt_again() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"\n", &[]);
        assert_eq!(sh.step(), Flow::Continue);
        assert_eq!(sh.console().take_output(), format!("{PROMPT}\n"));
        assert_eq!(sh.last_exit(), 0);
    }

    #[test]
    fn builtins() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"help\nclear\nexit\n", &[]);
        sh.step();
        assert!(sh
            .console()
            .take_output()
            .ends_with("Built-ins: ls, help, clear, exit\n"));
        sh.step();
        assert!(sh.console().take_output().ends_with("\x1b[2J\x1b[H"));
        assert_eq!(sh.step(), Flow::Halt);
        assert!(sh.console().take_output().ends_with("System halting.\n"));
    }

    #[test]
    fn run_stops_at_exit() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"ls\nhello\nexit\n", &[3]);
        sh.run();
        let out = sh.console().take_output();
        // the prompt that reads `exit` shows the code once, then clears it
        assert!(out.contains(" (3)"));
        assert!(out.ends_with("System halting.\n"));
        assert_eq!(sh.last_exit(), 0);
    }

    #[test]
    fn window_holds_only_the_new_program() {
        let mut rig = Rig::new();
        let mut sh = rig.shell(b"hello\n", &[0]);
        sh.step();
        let region = sh.loader().region();
        assert_eq!(&region[..4], b"\x13\x00\x00\x00");
        assert!(region[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn load_failures_set_126() {
        let mut rig = Rig::new();
        let disk = rig.disk.clone();
        let mut no_ram: [u8; 0] = [];
        let mut sh = Shell::new(
            MockConsole::new(b"hello\n"),
            Sfs::new(&disk, KSIZE).unwrap(),
            Kalloc::new(Addr(0x8040_0000), &mut no_ram),
            Loader::new(Addr(0x8020_0000), &mut rig.region),
            Script(vec![]),
        );
        sh.step();
        assert_eq!(sh.last_exit(), EXIT_CANNOT_EXEC);
        assert!(sh
            .console()
            .take_output()
            .ends_with("sh: hello: out of memory\n"));
    }

    #[test]
    fn banner_reports_ready() {
        let mut con = MockConsole::new(b"");
        banner(&mut con);
        let out = con.take_output();
        assert!(out.contains("RISC-V MicroKernel v"));
        assert!(out.contains("System Ready."));
    }
}
