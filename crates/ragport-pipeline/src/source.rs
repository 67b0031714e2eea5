//! Discovery and loading of GraphRAG output tables.
//!
//! Each table is looked up by its current file stem first and the legacy
//! `create_final_*` stem second, in Parquet, JSON Lines or JSON form.

use parquet::file::reader::{FileReader, SerializedFileReader};
use ragport_core::{
    CommunityRecord, CommunityReportRecord, CovariateRecord, DocumentRecord, EntityRecord,
    ImportError, ImportResult, RelationshipRecord, TextUnitRecord,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The tables produced by a GraphRAG indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    Documents,
    TextUnits,
    Entities,
    Relationships,
    Communities,
    CommunityReports,
    Covariates,
}

const EXTENSIONS: [(&str, TableFormat); 4] = [
    ("parquet", TableFormat::Parquet),
    ("jsonl", TableFormat::JsonLines),
    ("ndjson", TableFormat::JsonLines),
    ("json", TableFormat::Json),
];

impl SourceTable {
    pub fn stem(self) -> &'static str {
        match self {
            SourceTable::Documents => "documents",
            SourceTable::TextUnits => "text_units",
            SourceTable::Entities => "entities",
            SourceTable::Relationships => "relationships",
            SourceTable::Communities => "communities",
            SourceTable::CommunityReports => "community_reports",
            SourceTable::Covariates => "covariates",
        }
    }

    /// Tables without which no import makes sense.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            SourceTable::Documents
                | SourceTable::TextUnits
                | SourceTable::Entities
                | SourceTable::Relationships
        )
    }

    fn candidate_stems(self) -> [String; 2] {
        [self.stem().to_string(), format!("create_final_{}", self.stem())]
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Parquet,
    JsonLines,
    Json,
}

/// A directory holding GraphRAG output.
#[derive(Debug, Clone)]
pub struct SourceDir {
    dir: PathBuf,
}

impl SourceDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Locate the file for `table`, if any.
    pub fn find(&self, table: SourceTable) -> Option<(PathBuf, TableFormat)> {
        for stem in table.candidate_stems() {
            for (extension, format) in EXTENSIONS {
                let path = self.dir.join(format!("{stem}.{extension}"));
                if path.is_file() {
                    return Some((path, format));
                }
            }
        }
        None
    }

    /// Load and type every row of `table`.
    ///
    /// A missing optional table loads as empty; a missing required table is
    /// [`ImportError::MissingTable`].
    pub fn load<T: DeserializeOwned>(&self, table: SourceTable) -> ImportResult<Vec<T>> {
        let Some((path, format)) = self.find(table) else {
            if table.is_required() {
                return Err(ImportError::MissingTable {
                    table: table.to_string(),
                    dir: self.dir.clone(),
                });
            }
            info!("Optional table '{}' not found, skipping", table);
            return Ok(Vec::new());
        };

        debug!("Reading {} from {}", table, path.display());
        let rows = read_rows(&path, format).map_err(|message| ImportError::Source {
            table: table.to_string(),
            path: path.clone(),
            message,
        })?;

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                serde_json::from_value(value).map_err(|e| ImportError::Schema {
                    table: table.to_string(),
                    row,
                    message: e.to_string(),
                })
            })
            .collect::<ImportResult<Vec<T>>>()?;
        info!("Loaded {} rows from {}", records.len(), path.display());
        Ok(records)
    }
}

/// Read raw rows as JSON objects.
pub fn read_rows(path: &Path, format: TableFormat) -> Result<Vec<Value>, String> {
    match format {
        TableFormat::Parquet => read_parquet(path),
        TableFormat::JsonLines => read_json_lines(path),
        TableFormat::Json => read_json(path),
    }
}

fn read_parquet(path: &Path) -> Result<Vec<Value>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = SerializedFileReader::new(file).map_err(|e| e.to_string())?;
    let rows = reader.get_row_iter(None).map_err(|e| e.to_string())?;
    rows.map(|row| row.map(|r| r.to_json_value()).map_err(|e| e.to_string()))
        .collect()
}

fn read_json_lines(path: &Path) -> Result<Vec<Value>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut rows = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| e.to_string())?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line)
            .map_err(|e| format!("line {}: {}", number + 1, e))?;
        rows.push(value);
    }
    Ok(rows)
}

fn read_json(path: &Path) -> Result<Vec<Value>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    match serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())? {
        Value::Array(rows) => Ok(rows),
        _ => Err("expected a top-level array of rows".to_string()),
    }
}

/// Every table of one GraphRAG run, typed.
#[derive(Debug, Clone, Default)]
pub struct GraphRagOutput {
    pub documents: Vec<DocumentRecord>,
    pub text_units: Vec<TextUnitRecord>,
    pub entities: Vec<EntityRecord>,
    pub relationships: Vec<RelationshipRecord>,
    pub communities: Vec<CommunityRecord>,
    pub community_reports: Vec<CommunityReportRecord>,
    pub covariates: Vec<CovariateRecord>,
}

impl GraphRagOutput {
    /// Load all tables from `dir`. Fails before anything is written when a
    /// required table is missing or any row is malformed.
    pub fn load(dir: &SourceDir) -> ImportResult<Self> {
        Ok(Self {
            documents: dir.load(SourceTable::Documents)?,
            text_units: dir.load(SourceTable::TextUnits)?,
            entities: dir.load(SourceTable::Entities)?,
            relationships: dir.load(SourceTable::Relationships)?,
            communities: dir.load(SourceTable::Communities)?,
            community_reports: dir.load(SourceTable::CommunityReports)?,
            covariates: dir.load(SourceTable::Covariates)?,
        })
    }
}
