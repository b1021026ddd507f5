//! Per-student record and report storage rooted at a configured directory.
//!
//! Layout: `<base_dir>/<student_id>/student_data.json` plus one Markdown file
//! per session type. The root is created once by [`ReportStore::init`];
//! subject directories are created on first write.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::student::StudentRecord;

pub const RECORD_FILE: &str = "student_data.json";

#[derive(Debug, Clone)]
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    /// Create the storage root if needed and return a store bound to it.
    pub fn init(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let root = base_dir.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create storage root {}", root.display()))?;
        info!("Report store initialized at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one student. Ids that could escape the root are rejected.
    pub fn subject_dir(&self, student_id: &str) -> Result<PathBuf> {
        validate_subject_id(student_id)?;
        Ok(self.root.join(student_id))
    }

    fn ensure_subject_dir(&self, student_id: &str) -> Result<PathBuf> {
        let dir = self.subject_dir(student_id)?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Stored record for `student_id`, if one exists.
    pub fn load_record(&self, student_id: &str) -> Result<Option<StudentRecord>> {
        let path = self.subject_dir(student_id)?.join(RECORD_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let record = serde_json::from_str(&raw)
            .with_context(|| format!("malformed student record in {}", path.display()))?;
        debug!("Loaded record for {}", student_id);
        Ok(Some(record))
    }

    pub fn save_record(&self, record: &StudentRecord) -> Result<PathBuf> {
        let path = self.ensure_subject_dir(&record.student_id)?.join(RECORD_FILE);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("Saved record for {}", record.student_id);
        Ok(path)
    }

    pub fn write_report(&self, student_id: &str, file_name: &str, markdown: &str) -> Result<PathBuf> {
        validate_file_name(file_name)?;
        let path = self.ensure_subject_dir(student_id)?.join(file_name);
        fs::write(&path, markdown).with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote report {}", path.display());
        Ok(path)
    }

    /// Stored report text, if the report exists.
    pub fn read_report(&self, student_id: &str, file_name: &str) -> Result<Option<String>> {
        validate_file_name(file_name)?;
        let path = self.subject_dir(student_id)?.join(file_name);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Some(text))
    }
}

fn validate_subject_id(student_id: &str) -> Result<()> {
    let trimmed = student_id.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Student id cannot be empty"));
    }
    if trimmed != student_id
        || student_id.contains(['/', '\\'])
        || student_id == "."
        || student_id.contains("..")
        || student_id.chars().any(char::is_control)
    {
        return Err(anyhow!("Invalid student id '{}'", student_id));
    }
    Ok(())
}

fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.contains("..") {
        return Err(anyhow!("Invalid report file name '{}'", file_name));
    }
    Ok(())
}
