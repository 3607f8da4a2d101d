//! Options and output streams of a parsing session.

use crate::Name;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::{self, Display};
use fnv::FnvHashMap;
use std::io::{self, Write};

/// Print the results of commands such as `check`.
pub const VERBOSE: &str = "verbose";
/// Print errors on the diagnostic stream.
pub const SHOW_ERRORS: &str = "show_errors";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Nat(u64),
    Str(String),
}

impl Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bool(b) => b.fmt(f),
            Self::Nat(n) => n.fmt(f),
            Self::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Options set by the user, for example via `set_option`.
#[derive(Clone, Debug, Default)]
pub struct Options(FnvHashMap<Name, OptionValue>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.get(name)
    }

    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            Some(OptionValue::Bool(b)) => *b,
            _ => default,
        }
    }

    pub fn set(&mut self, name: Name, value: OptionValue) {
        self.0.insert(name, value);
    }
}

/// Options together with streams for regular and diagnostic output.
pub struct IoState {
    pub options: Options,
    regular: Box<dyn Write>,
    diagnostic: Box<dyn Write>,
}

impl IoState {
    pub fn new(regular: Box<dyn Write>, diagnostic: Box<dyn Write>) -> Self {
        Self {
            options: Options::new(),
            regular,
            diagnostic,
        }
    }

    /// Write regular output to stdout and diagnostics to stderr.
    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Discard all output.
    pub fn sink() -> Self {
        Self::new(Box::new(io::sink()), Box::new(io::sink()))
    }

    pub fn with_options(self, options: Options) -> Self {
        Self { options, ..self }
    }

    pub fn regular(&mut self) -> &mut dyn Write {
        &mut *self.regular
    }

    pub fn diagnostic(&mut self) -> &mut dyn Write {
        &mut *self.diagnostic
    }
}

/// Output buffer shared between an `IoState` and its owner,
/// so that the output can be inspected while a parser writes to it.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn options() {
    let mut opts = Options::new();
    assert!(opts.get_bool(VERBOSE, true));
    opts.set(Name::new(VERBOSE), OptionValue::Bool(false));
    assert!(!opts.get_bool(VERBOSE, true));
    opts.set(Name::new("depth"), OptionValue::Nat(3));
    assert!(opts.get_bool("depth", true));
}
