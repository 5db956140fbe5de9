use super::GameLibrary;
use crate::ui::progress::ProgressHandle;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::Read;

/// Read granularity while loading a game file
const READ_CHUNK: usize = 64 * 1024;

/// One row of the game browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub name: String,
    pub path: Utf8PathBuf,
    pub is_dir: bool,
}

impl LibraryEntry {
    /// Browser label; directories carry a trailing slash
    pub fn label(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    pub fn is_parent(&self) -> bool {
        self.is_dir && self.name == ".."
    }
}

/// Game browser over a directory tree, never leaving `root`
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    root: Utf8PathBuf,
    current: Utf8PathBuf,
    extensions: Vec<String>,
}

impl DirectoryLibrary {
    /// `extensions` filters game files (case-insensitive); empty accepts all
    pub fn new<P: AsRef<Utf8Path>>(root: P, extensions: &[&str]) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            current: root.clone(),
            root,
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }

    pub fn current_folder(&self) -> &Utf8Path {
        &self.current
    }

    fn accepts(&self, path: &Utf8Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .map(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

impl GameLibrary for DirectoryLibrary {
    fn entries(&mut self) -> Result<Vec<LibraryEntry>> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry in self
            .current
            .read_dir_utf8()
            .with_context(|| format!("Failed to read folder: {}", self.current))?
        {
            let entry = entry.with_context(|| format!("Failed to read entry in {}", self.current))?;
            let path = entry.path().to_path_buf();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_string();
            if name.starts_with('.') {
                continue;
            }
            if is_dir {
                dirs.push(LibraryEntry { name, path, is_dir });
            } else if self.accepts(&path) {
                files.push(LibraryEntry { name, path, is_dir });
            }
        }

        dirs.sort_by_key(|e| e.name.to_lowercase());
        files.sort_by_key(|e| e.name.to_lowercase());

        let mut entries = Vec::with_capacity(dirs.len() + files.len() + 1);
        if self.current != self.root {
            if let Some(parent) = self.current.parent() {
                entries.push(LibraryEntry {
                    name: "..".to_string(),
                    path: parent.to_path_buf(),
                    is_dir: true,
                });
            }
        }
        entries.extend(dirs);
        entries.extend(files);

        tracing::debug!("{} entries in {}", entries.len(), self.current);
        Ok(entries)
    }

    fn enter(&mut self, entry: &LibraryEntry) -> Result<()> {
        if !entry.is_dir {
            bail!("{} is not a folder", entry.name);
        }
        if !entry.path.starts_with(&self.root) {
            bail!("{} is outside the game library", entry.path);
        }
        tracing::info!("Entering folder {}", entry.path);
        self.current = entry.path.clone();
        Ok(())
    }

    fn open(&mut self, entry: &LibraryEntry, progress: &ProgressHandle) -> Result<Utf8PathBuf> {
        if entry.is_dir {
            bail!("{} is a folder", entry.name);
        }

        let mut file =
            File::open(&entry.path).with_context(|| format!("Failed to open {}", entry.path))?;
        let total = file
            .metadata()
            .with_context(|| format!("Failed to stat {}", entry.path))?
            .len();

        let mut buffer = vec![0u8; READ_CHUNK];
        let mut done = 0u64;
        loop {
            let read = file
                .read(&mut buffer)
                .with_context(|| format!("Failed to read {}", entry.path))?;
            if read == 0 {
                break;
            }
            done += read as u64;
            progress.show_progress("Loading...", done, total);
        }
        progress.cancel_action();

        tracing::info!("Read {} ({} bytes)", entry.path, done);
        Ok(entry.path.clone())
    }
}
