use clap::Args;
use itertools::Itertools;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{info, warn};
use ug2_pre::{resolve_filename, PreArchive, PreSpec, PreSpecEntry};

use super::create_output;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input PRE file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Skip writing a prespec for the extracted files
    #[arg(long, default_value_t = false)]
    no_spec: bool,

    /// Record disk paths in the prespec as given instead of absolute
    #[arg(long, default_value_t = false)]
    relative_spec: bool,

    /// Only report what would be written
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Skip entries that fail to extract instead of stopping
    #[arg(long, default_value_t = false)]
    keep_going: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let mut pre = PreArchive::new(&mut f)?;
        info!(
            entries = pre.len(),
            total_size = pre.header().total_size,
            "opened {}",
            self.file.display()
        );

        // Entries are extracted flat, so files sharing a name replace each other
        for name in pre
            .entries()
            .iter()
            .filter_map(|entry| resolve_filename(&entry.descriptor.path).ok())
            .duplicates()
        {
            warn!("more than one entry is named {name}");
        }

        let spec_root = if self.relative_spec {
            self.directory.clone()
        } else {
            std::env::current_dir()
                .into_diagnostic()?
                .join(&self.directory)
        };

        if !self.dry_run {
            std::fs::create_dir_all(&self.directory)
                .into_diagnostic()
                .context(format!("creating {}", self.directory.display()))?;
        }

        let mut spec = PreSpec::default();
        for i in 0..pre.len() {
            match self.extract_entry(&mut pre, i, &spec_root) {
                Ok(entry) => spec.entries.push(entry),
                Err(err) if self.keep_going => warn!("skipping entry {i}: {err:?}"),
                Err(err) => return Err(err),
            }
        }

        if !self.no_spec {
            let stem = self
                .file
                .file_stem()
                .ok_or(miette!("unable to create file stem"))?;
            let p = self
                .directory
                .join(format!("{}.prespec", stem.to_string_lossy()));

            if self.dry_run {
                info!("would write {}", p.display());
            } else {
                info!("writing {}", p.display());
                let out = create_output(&p, self.overwrite)?;
                spec.write(out)
                    .context(format!("writing {}", p.display()))?;
            }
        }

        Ok(())
    }

    fn extract_entry(
        &self,
        pre: &mut PreArchive<&mut File>,
        i: usize,
        spec_root: &Path,
    ) -> Result<PreSpecEntry> {
        let entry = &pre.entries()[i];
        let internal_path = entry.name();
        let name = resolve_filename(&entry.descriptor.path)
            .context(format!("resolving {internal_path}"))?;
        if name.is_empty() {
            return Err(miette!("entry {internal_path} has no file name"));
        }

        let p = self.directory.join(&name);
        if self.dry_run {
            info!("would write {}", p.display());
        } else {
            let data = pre
                .extract(i)
                .context(format!("extracting {internal_path}"))?;

            info!("writing {}", p.display());
            create_output(&p, self.overwrite)?
                .write_all(&data)
                .into_diagnostic()
                .context(format!("writing {}", p.display()))?;
        }

        Ok(PreSpecEntry::new(spec_root.join(&name), internal_path))
    }
}
