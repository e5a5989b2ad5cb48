use clap::{ArgAction, Args};
use itertools::Itertools;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::info;
use ug2_pre::{write::PreWriterOptions, PreSpec, PreSpecEntry, PreWriter};
use walkdir::WalkDir;

use super::create_output;

#[derive(Args)]
pub struct PackArgs {
    /// A prespec listing the files to pack
    #[arg(value_name = "PRESPEC")]
    spec: Option<PathBuf>,

    /// Add a file under the given internal path
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["FILE", "INTERNAL_PATH"],
        action = ArgAction::Append
    )]
    entry: Vec<String>,

    /// Add every file below a directory
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// A target PRE file
    #[arg(short, long, value_name = "FILE", default_value = "out.pre")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Only report what would be packed
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl PackArgs {
    fn collect_entries(&self) -> Result<Vec<PreSpecEntry>> {
        let mut entries = Vec::new();

        if let Some(spec) = &self.spec {
            let f = File::open(spec)
                .into_diagnostic()
                .context(format!("opening {}", spec.display()))?;
            entries.extend(
                PreSpec::read(f)
                    .context(format!("reading {}", spec.display()))?
                    .entries,
            );
        }

        entries.extend(
            self.entry
                .iter()
                .tuples()
                .map(|(file, internal_path)| PreSpecEntry::new(file, internal_path.as_str())),
        );

        if let Some(directory) = &self.directory {
            let files = WalkDir::new(directory)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| !e.file_type().is_dir());

            for file in files {
                let name = file.path().strip_prefix(directory).into_diagnostic()?;
                let internal_path = name
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .join("\\");
                entries.push(PreSpecEntry::new(file.path(), internal_path));
            }
        }

        Ok(entries)
    }

    pub fn handle(&self) -> Result<()> {
        let entries = self.collect_entries()?;
        if entries.is_empty() {
            return Err(miette!("no files to pack"));
        }

        if self.dry_run {
            for entry in &entries {
                info!(
                    "would pack {} as {}",
                    entry.disk_path.display(),
                    entry.internal_path
                );
            }
            return Ok(());
        }

        info!("creating {}", &self.output.display());
        let out = create_output(&self.output, self.overwrite)?;
        let mut pre = PreWriter::new(BufWriter::new(out), PreWriterOptions::default())?;

        for entry in &entries {
            info!("packing {}", entry.internal_path);

            pre.start_file(entry.internal_path.as_bytes())
                .context(format!("starting entry for {}", entry.internal_path))?;

            let mut f = File::open(&entry.disk_path)
                .into_diagnostic()
                .context(format!("opening {}", entry.disk_path.display()))?;

            std::io::copy(&mut f, &mut pre)
                .into_diagnostic()
                .context(format!("copying {}", entry.disk_path.display()))?;
        }

        pre.finish()
            .context("finalizing pre file")?
            .flush()
            .into_diagnostic()?;

        info!(entries = entries.len(), "wrote {}", self.output.display());

        Ok(())
    }
}
