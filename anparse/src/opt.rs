use clap::Parser;
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
/// Parse and check files with extensible notation
pub struct Opt {
    /// Do not print the results of commands such as `check`.
    ///
    /// Errors are still printed to standard error.
    #[arg(long, short)]
    pub quiet: bool,

    /// Stop at the first error.
    ///
    /// By default, an erroneous command is reported and
    /// parsing continues with the next command.
    #[arg(long)]
    pub use_exceptions: bool,

    /// Files to process (cumulative)
    ///
    /// Declarations and notation of a file are visible in all following files.
    /// To read from standard input, use "-" as file name.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}
