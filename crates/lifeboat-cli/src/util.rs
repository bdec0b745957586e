use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Serialize;

/// Locations of the persisted artifacts under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn dataset(&self) -> PathBuf {
        self.root.join("titanic.csv")
    }

    pub(crate) fn model(&self) -> PathBuf {
        self.root.join("models").join("titanic_model.json")
    }
}

/// Writes `value` to stdout as pretty JSON followed by a newline.
pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: Serialize,
{
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write JSON to stdout")?;
    writeln!(stdout).context("Failed to write newline after JSON to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// Creates the parent directory of `path` if it does not exist yet.
pub(crate) fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
