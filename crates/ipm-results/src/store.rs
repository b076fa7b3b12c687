//! Batch storage API.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{BatchManifest, Row, Table};
use crate::{ResultsError, ResultsResult};

#[derive(Clone, Debug)]
pub struct ResultStore {
    root_dir: PathBuf,
}

impl ResultStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(root_dir.join("batches"))?;
        Ok(Self { root_dir })
    }

    /// Store next to a project file, under `.ipmtune/results`.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let project_dir = project_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "project path has no parent directory".to_string(),
            })?;
        Self::new(project_dir.join(".ipmtune").join("results"))
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn table_path(&self, table: Table) -> PathBuf {
        self.root_dir.join(table.file_name())
    }

    fn manifest_path(&self, batch_id: &str) -> PathBuf {
        self.root_dir.join("batches").join(format!("{batch_id}.json"))
    }

    /// Appends rows to a table. Existing rows are never rewritten.
    pub fn append<T: Serialize>(
        &self,
        table: Table,
        batch_id: &str,
        records: &[T],
    ) -> ResultsResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut content = String::new();
        for record in records {
            let row = Row {
                batch_id: batch_id.to_string(),
                record,
            };
            content.push_str(&serde_json::to_string(&row)?);
            content.push('\n');
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.table_path(table))?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Reads every row of a table, oldest first.
    pub fn read<T: DeserializeOwned>(&self, table: Table) -> ResultsResult<Vec<Row<T>>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        let mut rows = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = serde_json::from_str(line).map_err(|source| ResultsError::MalformedRow {
                table: table.file_name(),
                line: i + 1,
                source,
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Rows of one batch.
    pub fn read_batch<T: DeserializeOwned>(
        &self,
        table: Table,
        batch_id: &str,
    ) -> ResultsResult<Vec<T>> {
        Ok(self
            .read::<T>(table)?
            .into_iter()
            .filter(|row| row.batch_id == batch_id)
            .map(|row| row.record)
            .collect())
    }

    pub fn has_batch(&self, batch_id: &str) -> bool {
        self.manifest_path(batch_id).exists()
    }

    pub fn save_manifest(&self, manifest: &BatchManifest) -> ResultsResult<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.manifest_path(&manifest.batch_id), json)?;
        Ok(())
    }

    pub fn load_manifest(&self, batch_id: &str) -> ResultsResult<BatchManifest> {
        let path = self.manifest_path(batch_id);
        if !path.exists() {
            return Err(ResultsError::BatchNotFound {
                batch_id: batch_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Resolves a unique batch id prefix, as printed by short listings.
    pub fn resolve(&self, prefix: &str) -> ResultsResult<BatchManifest> {
        let mut matches = self
            .list_batches()?
            .into_iter()
            .filter(|m| m.batch_id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(m), None) if !prefix.is_empty() => Ok(m),
            _ => Err(ResultsError::BatchNotFound {
                batch_id: prefix.to_string(),
            }),
        }
    }

    /// All batch manifests, oldest first.
    pub fn list_batches(&self) -> ResultsResult<Vec<BatchManifest>> {
        let dir = self.root_dir.join("batches");
        let mut batches = Vec::new();
        if !dir.exists() {
            return Ok(batches);
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json")
                && let Some(id) = path.file_stem().and_then(|s| s.to_str())
                && let Ok(manifest) = self.load_manifest(id)
            {
                batches.push(manifest);
            }
        }
        batches.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(batches)
    }
}
