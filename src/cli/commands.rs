use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tm", about = concat!("taskmaster v", env!("CARGO_PKG_VERSION"), " - deadlines in a plain CSV file"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task file to use (default: storage.file from the config)
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The task file starts with a header line to skip
    #[arg(long, global = true)]
    pub legacy_header: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks in deadline order with the "now" divider (default)
    List(ListArgs),
    /// Add a task from a storage line, e.g. "03/05,10:00,Math,Problem set,0"
    Add(AddArgs),
    /// Flip a task between done and not done
    Toggle(IdArgs),
    /// Remove a task
    Rm(IdArgs),
    /// Report every malformed line in the task file
    Check,
    /// Show recent recovery log entries
    Recovery(RecoveryArgs),
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Show the latest deadlines first
    #[arg(long)]
    pub reverse: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// The task as one storage line
    pub text: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task id, as printed by `tm list`
    pub id: i64,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}
