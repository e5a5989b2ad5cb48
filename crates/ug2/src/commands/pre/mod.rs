use miette::{Context, IntoDiagnostic, Result};
use std::{fs::File, path::Path};

pub mod extract;
pub mod list;
pub mod pack;

#[derive(clap::Subcommand)]
pub enum PreCommands {
    /// List the contents of a PRE file
    List(list::ListArgs),
    /// Extract a PRE file into a directory
    Extract(extract::ExtractArgs),
    /// Pack files into a PRE file
    Pack(pack::PackArgs),
}

impl PreCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            PreCommands::List(list) => list.handle(),
            PreCommands::Extract(extract) => extract.handle(),
            PreCommands::Pack(pack) => pack.handle(),
        }
    }
}

/// Create `path`, refusing to replace an existing file unless `overwrite` is set
fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}
