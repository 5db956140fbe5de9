use super::SaveStore;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fmt;
use std::fs;

/// Slots per game and kind; slot 0 is the automatic save
pub const MAX_SAVES: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveKind {
    /// Battery-backed memory card data (`.srm`)
    Sram,
    /// Full machine snapshot (`.frz`)
    Snapshot,
}

impl SaveKind {
    pub fn extension(self) -> &'static str {
        match self {
            SaveKind::Sram => "srm",
            SaveKind::Snapshot => "frz",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "srm" => Some(SaveKind::Sram),
            "frz" => Some(SaveKind::Snapshot),
            _ => None,
        }
    }
}

impl fmt::Display for SaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveKind::Sram => f.write_str("SRAM"),
            SaveKind::Snapshot => f.write_str("Snapshot"),
        }
    }
}

/// One save belonging to the loaded game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFile {
    pub game: String,
    pub slot: u8,
    pub kind: SaveKind,
}

impl SaveFile {
    pub fn new(game: impl Into<String>, slot: u8, kind: SaveKind) -> Self {
        Self {
            game: game.into(),
            slot,
            kind,
        }
    }

    pub fn auto(game: impl Into<String>, kind: SaveKind) -> Self {
        Self::new(game, 0, kind)
    }

    pub fn is_auto(&self) -> bool {
        self.slot == 0
    }

    pub fn file_name(&self) -> String {
        if self.is_auto() {
            format!("{} Auto.{}", self.game, self.kind.extension())
        } else {
            format!("{} {}.{}", self.game, self.slot, self.kind.extension())
        }
    }

    /// Label for the save list
    pub fn label(&self) -> String {
        if self.is_auto() {
            format!("{} (Auto)", self.kind)
        } else {
            format!("{} {}", self.kind, self.slot)
        }
    }
}

/// Recognizes `"<game> Auto.<ext>"` and `"<game> N.<ext>"` save names
#[derive(Debug, Clone)]
pub struct SaveNameParser {
    pattern: Regex,
}

impl SaveNameParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"^(?P<game>.+) (?:(?P<auto>Auto)|(?P<slot>\d{1,2}))\.(?P<ext>[A-Za-z]{3})$")
                .expect("Invalid save name regex"),
        }
    }

    /// Parse `file_name` as a save of `game`; anything else is `None`
    pub fn parse(&self, game: &str, file_name: &str) -> Option<SaveFile> {
        let caps = self.pattern.captures(file_name)?;
        if &caps["game"] != game {
            return None;
        }
        let kind = SaveKind::from_extension(&caps["ext"])?;
        let slot = if caps.name("auto").is_some() {
            0
        } else {
            caps["slot"].parse::<u8>().ok()?
        };
        (slot < MAX_SAVES).then(|| SaveFile::new(game, slot, kind))
    }

    /// All saves of `game` among `names`, sorted by kind then slot
    pub fn collect<'a>(&self, game: &str, names: impl IntoIterator<Item = &'a str>) -> Vec<SaveFile> {
        let mut saves: Vec<SaveFile> = names
            .into_iter()
            .filter_map(|name| self.parse(game, name))
            .collect();
        saves.sort_by_key(|s| (s.kind == SaveKind::Snapshot, s.slot));
        saves.dedup();
        saves
    }
}

impl Default for SaveNameParser {
    fn default() -> Self {
        Self::new()
    }
}

/// First unused numbered slot (1..100) of `kind`
pub fn next_free_slot(existing: &[SaveFile], kind: SaveKind) -> Option<u8> {
    (1..MAX_SAVES).find(|slot| !existing.iter().any(|s| s.kind == kind && s.slot == *slot))
}

/// Save store over plain directories, one per device
#[derive(Debug, Clone)]
pub struct DirectorySaveStore {
    devices: Vec<(String, Utf8PathBuf)>,
}

impl DirectorySaveStore {
    pub fn new(devices: Vec<(String, Utf8PathBuf)>) -> Self {
        Self { devices }
    }

    fn folder(&self, device: usize, folder: &str) -> Result<Utf8PathBuf> {
        let Some((name, root)) = self.devices.get(device) else {
            bail!("Save device {} is not available", device);
        };
        tracing::debug!("Using save device {} at {}", name, root);
        Ok(root.join(folder))
    }
}

impl SaveStore for DirectorySaveStore {
    fn devices(&self) -> Vec<String> {
        self.devices.iter().map(|(name, _)| name.clone()).collect()
    }

    fn list(&mut self, device: usize, folder: &str) -> Result<Vec<String>> {
        let dir = self.folder(device, folder)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in dir
            .read_dir_utf8()
            .with_context(|| format!("Failed to read save folder: {}", dir))?
        {
            let entry = entry.with_context(|| format!("Failed to read entry in {}", dir))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                names.push(entry.file_name().to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&mut self, device: usize, folder: &str, save: &SaveFile) -> Result<()> {
        let path = self.folder(device, folder)?.join(save.file_name());
        let data = fs::read(&path).with_context(|| format!("Failed to read save: {}", path))?;
        tracing::info!("Loaded {} ({} bytes)", path, data.len());
        Ok(())
    }

    fn save(&mut self, device: usize, folder: &str, save: &SaveFile) -> Result<()> {
        let dir = self.folder(device, folder)?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create save folder: {}", dir))?;

        let path = dir.join(save.file_name());
        write_marker(&path, save)?;
        tracing::info!("Saved {}", path);
        Ok(())
    }
}

fn write_marker(path: &Utf8Path, save: &SaveFile) -> Result<()> {
    fs::write(path, format!("{}\n{}\n{}\n", save.game, save.kind, save.slot))
        .with_context(|| format!("Failed to write save: {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_auto_and_numbered() {
        let parser = SaveNameParser::new();
        assert_eq!(
            parser.parse("Crash", "Crash Auto.srm"),
            Some(SaveFile::auto("Crash", SaveKind::Sram))
        );
        assert_eq!(
            parser.parse("Crash", "Crash 7.frz"),
            Some(SaveFile::new("Crash", 7, SaveKind::Snapshot))
        );
        assert_eq!(
            parser.parse("Crash", "Crash 42.SRM"),
            Some(SaveFile::new("Crash", 42, SaveKind::Sram))
        );
    }

    #[test]
    fn test_parse_rejects_other_games_and_names() {
        let parser = SaveNameParser::new();
        assert_eq!(parser.parse("Crash", "Spyro 1.srm"), None);
        assert_eq!(parser.parse("Crash", "Crash 100.srm"), None);
        assert_eq!(parser.parse("Crash", "Crash 1.sav"), None);
        assert_eq!(parser.parse("Crash", "Crash.srm"), None);
    }

    #[test]
    fn test_game_names_with_spaces_and_digits() {
        let parser = SaveNameParser::new();
        assert_eq!(
            parser.parse("Final Fantasy 7", "Final Fantasy 7 3.srm"),
            Some(SaveFile::new("Final Fantasy 7", 3, SaveKind::Sram))
        );
        assert_eq!(parser.parse("Final Fantasy", "Final Fantasy 7 3.srm"), None);
    }

    #[test]
    fn test_next_free_slot_skips_used() {
        let existing = vec![
            SaveFile::new("G", 1, SaveKind::Sram),
            SaveFile::new("G", 2, SaveKind::Sram),
            SaveFile::new("G", 1, SaveKind::Snapshot),
            SaveFile::auto("G", SaveKind::Sram),
        ];
        assert_eq!(next_free_slot(&existing, SaveKind::Sram), Some(3));
        assert_eq!(next_free_slot(&existing, SaveKind::Snapshot), Some(2));
    }

    #[test]
    fn test_next_free_slot_full() {
        let existing: Vec<SaveFile> = (1..MAX_SAVES)
            .map(|slot| SaveFile::new("G", slot, SaveKind::Sram))
            .collect();
        assert_eq!(next_free_slot(&existing, SaveKind::Sram), None);
    }

    #[test]
    fn test_directory_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let mut store = DirectorySaveStore::new(vec![("sd".to_string(), root)]);

        assert!(store.list(0, "saves").unwrap().is_empty());

        let save = SaveFile::new("Crash", 1, SaveKind::Sram);
        store.save(0, "saves", &save).unwrap();
        assert_eq!(store.list(0, "saves").unwrap(), vec!["Crash 1.srm".to_string()]);
        store.load(0, "saves", &save).unwrap();

        assert!(store.list(3, "saves").is_err());
        assert!(store.load(0, "saves", &SaveFile::new("Crash", 2, SaveKind::Sram)).is_err());
    }
}
