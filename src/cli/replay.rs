//! JSON-lines experience input

use crate::memory::types::NewExperience;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse experiences, one JSON object per line
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_experiences<R: BufRead>(reader: R) -> Result<Vec<NewExperience>> {
    let mut experiences = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let experience: NewExperience = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid experience on line {}", index + 1))?;
        experiences.push(experience);
    }

    Ok(experiences)
}

/// Parse experiences from a file
pub fn load_experiences(path: &Path) -> Result<Vec<NewExperience>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_experiences(BufReader::new(file))
}
