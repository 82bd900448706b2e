use directories::ProjectDirs;
use std::{
    error::Error,
    fmt::Display,
    fs::OpenOptions,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

const PREFERENCES_FILE: &str = "preferences.toml";

/// Writes `contents` to a sibling temp file, then renames it over `path`,
/// so readers never see a half-written file.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(WriteError::CreateDir)?;
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let mut tmp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)
        .map_err(WriteError::OpenTmpFile)?;

    tmp_file.write_all(contents).map_err(WriteError::Write)?;
    tmp_file.flush().map_err(WriteError::Write)?;
    drop(tmp_file);

    std::fs::rename(&tmp_path, path).map_err(WriteError::Rename)?;

    Ok(())
}

/// Where user preferences live: a single TOML table in the platform's
/// config directory.
#[derive(Clone, Debug)]
pub struct PrefsStore {
    path: Option<PathBuf>,
}

impl PrefsStore {
    /// The platform config directory, if one can be found.
    pub fn from_project_dirs() -> Self {
        let path = ProjectDirs::from("io.github", "gravity-sim-demo", "gravity_sim_demo")
            .map(|dirs| dirs.config_dir().join(PREFERENCES_FILE));
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: Some(dir.join(PREFERENCES_FILE)),
        }
    }

    /// A store that never persists anything.
    pub fn detached() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn get_table(&self) -> toml::value::Table {
        let Some(path) = &self.path else {
            return toml::value::Table::new();
        };
        let Ok(mut file) = OpenOptions::new().read(true).open(path) else {
            return toml::value::Table::new();
        };

        let mut string = String::new();
        let Ok(_) = file.read_to_string(&mut string) else {
            return toml::value::Table::new();
        };

        toml::from_str(&string).unwrap_or_default()
    }

    pub(super) fn save<T: Serialize>(&self, key: &str, value: T) -> Result<(), SaveError> {
        let path = self.path.as_ref().ok_or(SaveError::NoSaveDirectory)?;

        let value = toml::Value::try_from(value).map_err(SaveError::SerializeValue)?;

        let mut table = self.get_table();
        table.insert(key.to_string(), value);
        let table_string = toml::to_string(&table).map_err(SaveError::StringifyTable)?;

        write_atomically(path, table_string.as_bytes()).map_err(SaveError::Write)
    }

    pub(super) fn load<T: for<'d> Deserialize<'d>>(&self, key: &str) -> Result<T, LoadError> {
        let path = self.path.as_ref().ok_or(LoadError::NoSaveDirectory)?;
        let mut file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(LoadError::OpenFile)?;

        let mut string = String::new();
        file.read_to_string(&mut string)
            .map_err(LoadError::ReadFile)?;
        drop(file);

        let mut table: toml::value::Table =
            toml::from_str(&string).map_err(LoadError::DeserializeFile)?;

        let value = table.remove(key).ok_or(LoadError::NotFoundInTable)?;
        value.try_into().map_err(LoadError::DeserializeValue)
    }
}

#[derive(Debug)]
pub enum WriteError {
    CreateDir(io::Error),
    OpenTmpFile(io::Error),
    Write(io::Error),
    Rename(io::Error),
}

impl Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::CreateDir(error) => write!(f, "CreateDir: {error}"),
            WriteError::OpenTmpFile(error) => write!(f, "OpenTmpFile: {error}"),
            WriteError::Write(error) => write!(f, "Write: {error}"),
            WriteError::Rename(error) => write!(f, "Rename: {error}"),
        }
    }
}

impl Error for WriteError {}

#[derive(Debug)]
pub enum SaveError {
    NoSaveDirectory,
    SerializeValue(toml::ser::Error),
    StringifyTable(toml::ser::Error),
    Write(WriteError),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::NoSaveDirectory => write!(f, "No reasonable save directory was found"),
            SaveError::SerializeValue(error) => write!(f, "SerializeValue: {error}"),
            SaveError::StringifyTable(error) => write!(f, "StringifyTable: {error}"),
            SaveError::Write(error) => write!(f, "{error}"),
        }
    }
}

impl Error for SaveError {}

#[derive(Debug)]
pub enum LoadError {
    NoSaveDirectory,
    OpenFile(io::Error),
    ReadFile(io::Error),
    DeserializeFile(toml::de::Error),
    NotFoundInTable,
    DeserializeValue(toml::de::Error),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NoSaveDirectory => write!(f, "No reasonable save directory was found"),
            LoadError::OpenFile(error) => write!(f, "OpenFile: {error}"),
            LoadError::ReadFile(error) => write!(f, "ReadFile: {error}"),
            LoadError::DeserializeFile(error) => write!(f, "DeserializeFile: {error}"),
            LoadError::NotFoundInTable => write!(f, "Key not found in table"),
            LoadError::DeserializeValue(error) => write!(f, "DeserializeValue: {error}"),
        }
    }
}

impl Error for LoadError {}
