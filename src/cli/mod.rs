use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "env-injector",
    version,
    about = "Inject AWS SSM parameters into the environment, then exec a command"
)]
pub struct Cli {
    /// Print debug diagnostics to stderr (also ENV_INJECTOR_VERBOSE)
    #[arg(short, long)]
    pub verbose: bool,

    /// Load a dotenv file before injecting; existing variables win
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Print a JSON report of what would be injected instead of running
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required_unless_present = "dry_run"
    )]
    pub command: Vec<OsString>,
}
