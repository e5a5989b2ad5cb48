pub mod pre;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle PRE files
    Pre {
        #[command(subcommand)]
        command: pre::PreCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Pre { command } => command.handle(),
        }
    }
}
