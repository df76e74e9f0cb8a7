use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use memfs_shell::{Shell, ShellError};

#[derive(Parser)]
#[command(name = "memfs")]
#[command(about = "Run file system commands against an in-memory file system")]
struct Args {
    /// File of commands to run, one per line. Reads standard input when omitted.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Initialize the file system with this many descriptors before the first command
    #[arg(short, long)]
    mkfs: Option<usize>,

    /// Print listings without ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Log every operation to standard error
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> Result<(), ShellError> {
    let stdout = io::stdout();
    let mut shell = Shell::new(stdout.lock()).with_color(!args.no_color);

    if let Some(descriptors) = args.mkfs {
        shell.mkfs(descriptors)?;
    }

    match args.script {
        Some(path) => shell.run(BufReader::new(File::open(path)?)),
        None => {
            let stdin = io::stdin();
            let input = stdin.lock();
            shell.run(input)
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(args) {
        eprintln!("memfs: {}", err);
        process::exit(1);
    }
}
