//! Read/write the persisted stream state file (`{"date": "YYYY-MM-DD"}`).

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::domain::CursorState;
use crate::error::{Result, SourceError};

/// Load stored state. A missing file, or one without a `date`, means no state yet.
pub fn read_state(path: &Path) -> Result<Option<CursorState>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let value: Value = serde_json::from_reader(file).map_err(|e| {
        SourceError::InvalidState(format!("Invalid state JSON '{}': {e}", path.display()))
    })?;
    CursorState::from_value(&value)
}

/// Replace the state file with `state`.
///
/// Written to a sibling temp file and renamed so an interrupted write never
/// leaves a truncated state behind.
pub fn write_state(path: &Path, state: &CursorState) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp)?;
        serde_json::to_writer(&mut file, &state.to_value())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn missing_state_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_state(&dir.path().join("state.json")).unwrap(), None);
    }

    #[test]
    fn written_state_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let state = CursorState::new(NaiveDate::from_ymd_opt(2021, 12, 1).unwrap());

        write_state(&path, &state).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), r#"{"date":"2021-12-01"}"#);
        assert_eq!(read_state(&path).unwrap(), Some(state));
    }

    #[test]
    fn corrupt_state_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"date":"2021-99-99"}"#).unwrap();
        assert!(matches!(read_state(&path), Err(SourceError::InvalidState(_))));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(read_state(&path), Err(SourceError::InvalidState(_))));
    }
}
