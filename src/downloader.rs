use std::{
    io::Write,
    path::{Path, PathBuf},
    process::ExitStatus,
};

use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::error::DownloadError;

/// How links are handed to the downloader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Every link becomes one argument.
    Args,
    /// Links are written one per line to a temporary file whose path is the
    /// only argument.
    File,
}

/// External batch downloader, invoked once per run with an argument list.
#[derive(Debug, Clone)]
pub struct Downloader {
    program: String,
    mode: LinkMode,
}

impl Downloader {
    pub fn new(program: impl Into<String>, mode: LinkMode) -> Self {
        Self {
            program: program.into(),
            mode,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the downloader over `links` and waits for it to exit.
    pub async fn download(&self, links: &[String]) -> Result<ExitStatus, DownloadError> {
        match self.mode {
            LinkMode::Args => self.invoke(links.iter().map(String::as_str)).await,
            LinkMode::File => {
                let file = write_link_file(links)?;
                let path = file.path().to_string_lossy().into_owned();
                // `file` is removed when dropped, after the downloader exits.
                self.invoke(std::iter::once(path.as_str())).await
            }
        }
    }

    async fn invoke<'a>(
        &self,
        args: impl IntoIterator<Item = &'a str>,
    ) -> Result<ExitStatus, DownloadError> {
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .await
            .map_err(|source| DownloadError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(status)
        } else {
            Err(DownloadError::Failed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

/// Writes `links` newline-delimited to a fresh temporary file.
pub fn write_link_file(links: &[String]) -> Result<NamedTempFile, DownloadError> {
    let mut file = tempfile::Builder::new()
        .prefix("spordl-")
        .suffix(".txt")
        .tempfile()?;
    for link in links {
        writeln!(file, "{link}")?;
    }
    file.flush()?;
    Ok(file)
}

/// Writes `links` newline-delimited to `path`, for `--save-links`.
pub async fn save_link_file(path: &Path, links: &[String]) -> Result<PathBuf, DownloadError> {
    let mut content = links.join("\n");
    content.push('\n');
    tokio::fs::write(path, content).await?;
    Ok(path.to_path_buf())
}
