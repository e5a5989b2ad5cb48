use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream::Stdout};
use std::{fs::File, path::PathBuf};
use ug2_pre::PreArchive;

#[derive(Args)]
pub struct ListArgs {
    /// An input PRE file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let pre = PreArchive::new(f)?;

        println!(
            "{} entries, {} bytes",
            pre.len(),
            pre.header().total_size
        );
        println!("{:>10} {:>10} {:<6} name", "packed", "size", "method");

        for entry in pre.entries() {
            let method = entry.descriptor.compression_method().to_string();
            println!(
                "{:>10} {:>10} {:<6} {}",
                entry.descriptor.compressed_size,
                entry.descriptor.raw_size,
                method.if_supports_color(Stdout, |text| text.cyan()),
                entry.name()
            );
        }

        Ok(())
    }
}
