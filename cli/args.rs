use clap::{Parser, Subcommand};
use neatify_core::{BatchOptions, DiscoveryOptions};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    about = "Check or format source files in place",
    long_about = "Formats the given files and directories.\nDirectories are expanded recursively, honoring .neatignore and the built-in exclusions."
)]
pub struct NeatifyArgs {
    #[clap(help = "Files or directories to process", default_value = ".")]
    pub files: Vec<PathBuf>,

    #[clap(
        short,
        long,
        help = "Check if files need formatting without modifying them"
    )]
    pub check: bool,

    #[clap(short, long, help = "Write formatted output back to files")]
    pub write: bool,

    #[clap(short = 'l', long, help = "List files that need formatting, one per line")]
    pub list_different: bool,

    #[clap(long, help = "Do not read the .neatignore file")]
    pub no_ignore: bool,

    #[clap(
        long,
        value_name = "PATH",
        help = "Read ignore rules from this file instead of <dir>/.neatignore"
    )]
    pub ignore_path: Option<PathBuf>,

    #[clap(long, help = "Include hidden files and directories")]
    pub include_hidden: bool,

    #[clap( long, value_name = "PATTERN", help = "Gitignore-style pattern to exclude [multiple allowed]", action = clap::ArgAction::Append )]
    pub ignore: Vec<String>,

    #[clap(
        short,
        long,
        value_name = "N",
        help = "Number of files processed in parallel (1 = sequential)"
    )]
    pub jobs: Option<usize>,

    #[clap(
        long,
        value_name = "PROGRAM",
        help = "External formatter reading stdin and writing stdout [default: built-in whitespace tidy]"
    )]
    pub formatter: Option<String>,

    #[clap( long, value_name = "ARG", help = "Argument passed to --formatter [multiple allowed]", action = clap::ArgAction::Append, allow_hyphen_values = true, requires = "formatter" )]
    pub formatter_arg: Vec<String>,

    #[clap(long, help = "Check that --formatter can be run, then exit", requires = "formatter")]
    pub check_formatter: bool,

    #[clap(short, long, action = clap::ArgAction::Count, help = "Verbose output (-vv for debug logs)")]
    pub verbose: u8,
}

impl NeatifyArgs {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            discovery: DiscoveryOptions {
                extra_ignores: self.ignore.clone(),
                include_hidden: self.include_hidden,
                use_ignore_file: !self.no_ignore,
                ignore_path: self.ignore_path.clone(),
            },
            jobs: self.jobs,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    #[clap(about = "Generate shell completion scripts")]
    Completion(CompletionArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct CompletionArgs {
    #[clap(value_parser = clap::value_parser!(clap_complete::Shell))]
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "neatify",
    version,
    about = "Batch code formatter",
    propagate_version = true
)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<Command>,

    #[clap(flatten)]
    pub main_opts: NeatifyArgs,
}
