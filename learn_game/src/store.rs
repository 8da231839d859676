use crate::board::{Action, Mark, StateKey};
use crate::error::StorageError;
use crate::q_table::QTable;
use chrono::offset::Local;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, prelude::*, BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Json,
    Pickle,
}

impl StoreFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("pickle") | Some("pkl") => StoreFormat::Pickle,
            _ => StoreFormat::Json,
        }
    }
    pub fn extension(self) -> &'static str {
        match self {
            StoreFormat::Json => "json",
            StoreFormat::Pickle => "pickle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct QRecord {
    state: String,
    row: u8,
    col: u8,
    value: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct QTableFile {
    version: u32,
    saved_at: String,
    records: Vec<QRecord>,
}

/// Why a `(state, action, value)` triple cannot be stored, if it cannot.
fn record_problem(state: &StateKey, action: Action, value: f64) -> Option<String> {
    if !state.is_well_formed() {
        return Some(format!("malformed state {:?}", state.as_str()));
    }
    match state.cell(action) {
        None => return Some(format!("square {action:?} is outside the board")),
        Some(Mark::Empty) => {}
        Some(_) => return Some(format!("square {action:?} is taken in {state:?}")),
    }
    if !value.is_finite() {
        return Some(format!("value {value} is not finite"));
    }
    None
}

impl QTableFile {
    /// Runs the same checks as `into_table`, so a saved file always loads.
    fn from_table(q: &QTable, path: &Path) -> Result<Self, StorageError> {
        let records = q
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .enumerate()
            .map(|(index, ((state, action), &value))| {
                let invalid = |reason: String| StorageError::InvalidRecord {
                    path: path.to_path_buf(),
                    index,
                    reason,
                };
                if let Some(reason) = record_problem(state, *action, value) {
                    return Err(invalid(reason));
                }
                let (row, col) = (u8::try_from(action.0), u8::try_from(action.1));
                let (Ok(row), Ok(col)) = (row, col) else {
                    return Err(invalid(format!("square {action:?} is outside the board")));
                };
                Ok(QRecord {
                    state: state.to_string(),
                    row,
                    col,
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QTableFile {
            version: FORMAT_VERSION,
            saved_at: Local::now().to_rfc3339(),
            records,
        })
    }

    fn into_table(self, path: &Path) -> Result<QTable, StorageError> {
        if self.version != FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: self.version,
                expected: FORMAT_VERSION,
            });
        }
        self.records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let action = (record.row as usize, record.col as usize);
                let state = StateKey::from(record.state);
                match record_problem(&state, action, record.value) {
                    Some(reason) => Err(StorageError::InvalidRecord {
                        path: path.to_path_buf(),
                        index,
                        reason,
                    }),
                    None => Ok(((state, action), record.value)),
                }
            })
            .collect()
    }
}

/// File-backed home of a Q-table. The whole table is read or written at once.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: PathBuf,
    format: StoreFormat,
}

impl PolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = StoreFormat::from_path(&path);
        PolicyStore { path, format }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// A missing file is a fresh start and yields an empty table.
    pub fn load(&self) -> Result<QTable, StorageError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no Q-table at {}, starting empty", self.path.display());
                return Ok(QTable::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let reader = BufReader::new(file);
        let decoded: QTableFile = match self.format {
            StoreFormat::Json => {
                serde_json::from_reader(reader).map_err(|source| StorageError::Json {
                    path: self.path.clone(),
                    source,
                })?
            }
            StoreFormat::Pickle => serde_pickle::from_reader(reader, serde_pickle::DeOptions::new())
                .map_err(|source| StorageError::Pickle {
                    path: self.path.clone(),
                    source,
                })?,
        };
        let q = decoded.into_table(&self.path)?;
        log::info!("loaded {} Q-values from {}", q.len(), self.path.display());
        Ok(q)
    }

    /// Replaces the backing file through a temp file and a rename.
    pub fn save(&self, q: &QTable) -> Result<(), StorageError> {
        write_atomically(&self.path, self.format, q)?;
        log::info!("saved {} Q-values to {}", q.len(), self.path.display());
        Ok(())
    }

    /// Writes a dated snapshot `qtable-YYYY-MM-DD.<ext>` into `dir`.
    pub fn archive(&self, dir: &Path, q: &QTable) -> Result<PathBuf, StorageError> {
        let today = Local::now().date_naive();
        let filename = format!("qtable-{}.{}", today, self.format.extension());
        let target: PathBuf = [dir, Path::new(&filename)].iter().collect();
        write_atomically(&target, self.format, q)?;
        log::info!("archived Q-table to {}", target.display());
        Ok(target)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomically(path: &Path, format: StoreFormat, q: &QTable) -> Result<(), StorageError> {
    let data = QTableFile::from_table(q, path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let tmp = tmp_path(path);
    let written = write_file(&tmp, path, format, &data)
        .and_then(|()| {
            fs::rename(&tmp, path).map_err(|source| StorageError::Write {
                path: path.to_path_buf(),
                source,
            })
        });
    if written.is_err() {
        // `path` still holds the previous table
        if let Err(e) = fs::remove_file(&tmp) {
            log::debug!("could not remove {}: {}", tmp.display(), e);
        }
    }
    written
}

fn write_file(
    tmp: &Path,
    path: &Path,
    format: StoreFormat,
    data: &QTableFile,
) -> Result<(), StorageError> {
    let write_err = |source: io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(tmp).map_err(write_err)?);
    match format {
        StoreFormat::Json => {
            serde_json::to_writer(&mut writer, data).map_err(|e| write_err(e.into()))?
        }
        StoreFormat::Pickle => {
            serde_pickle::to_writer(&mut writer, data, serde_pickle::SerOptions::new()).map_err(
                |source| StorageError::Pickle {
                    path: path.to_path_buf(),
                    source,
                },
            )?
        }
    }
    writer.flush().map_err(write_err)?;
    let file = writer.into_inner().map_err(|e| write_err(e.into_error()))?;
    file.sync_all().map_err(write_err)
}
