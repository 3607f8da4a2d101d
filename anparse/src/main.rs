//! Parse and check files with extensible notation.

mod error;
mod opt;

use analizi::io::{OptionValue, VERBOSE};
use analizi::{parse_commands, Environment, IoState, Name};
use clap::Parser;
use error::Error;
use opt::Opt;
use std::io::{self, Read};
use std::path::Path;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Read the contents of a file, or of stdin if the path is "-".
fn read(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s)?;
        Ok(s)
    } else {
        std::fs::read_to_string(path)
    }
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env("LOG").init();

    let opt = Opt::parse();

    let mut ios = IoState::stdio();
    if opt.quiet {
        ios.options.set(Name::new(VERBOSE), OptionValue::Bool(false));
    }

    let mut env = Environment::new();
    let mut ok = true;
    for path in &opt.files {
        log::info!("Process {}", path.display());
        let input = read(path)?;
        let name = path.display().to_string();
        // later files see the declarations of earlier ones, even if they failed
        ok &= parse_commands(&mut env, &mut ios, &input, &name, None, opt.use_exceptions)?;
    }

    if ok {
        Ok(())
    } else {
        Err(Error::Failed)
    }
}
