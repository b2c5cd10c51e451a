use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::types::Gesture;

/// Writes the gesture library to `path` as JSON.
///
/// An existing file is copied to a `.bak` sibling first; if the write then
/// fails, the backup is copied back so the library on disk is never left
/// half-written.
pub fn save_gestures(path: &Path, gestures: &[Gesture]) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let backup = backup_path(path);
    let had_backup = path.exists();
    if had_backup {
        fs::copy(path, &backup)?;
    }

    let result = write_library(path, gestures);
    if result.is_err() && had_backup {
        if let Err(restore_err) = fs::copy(&backup, path) {
            log::error!("failed to restore gesture library backup: {restore_err}");
        }
    }
    result
}

fn write_library(path: &Path, gestures: &[Gesture]) -> Result<(), EngineError> {
    let json = serde_json::to_vec_pretty(gestures)?;
    fs::write(path, json)?;
    Ok(())
}

/// Reads a gesture library previously written by [`save_gestures`]. The
/// caller replaces its in-memory library wholesale with the result.
pub fn load_gestures(path: &Path) -> Result<Vec<Gesture>, EngineError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Fingertip, Hand};
    use crate::vector::Vec3;

    fn sample_library() -> Vec<Gesture> {
        let tip = Fingertip {
            position: Vec3::new(12.5, -3.0, 0.0),
            direction: Vec3::new(0.25, -1.0, 0.0),
            bisect: Vec3::new(14.0, -20.5, 0.0),
        };
        let hand = Hand::from_fingertips(&[tip, tip, tip]);
        vec![
            Gesture::new("wave", vec![hand; 12]),
            Gesture::new("wave", vec![Hand::default(); 10]),
            Gesture::new("push", vec![hand; 15]),
        ]
    }

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("handwave-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn library_round_trips_exactly() {
        let path = scratch_file("roundtrip");
        let library = sample_library();

        save_gestures(&path, &library).unwrap();
        let loaded = load_gestures(&path).unwrap();
        assert_eq!(loaded, library);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(backup_path(&path));
    }

    #[test]
    fn saving_over_an_existing_file_leaves_a_backup() {
        let path = scratch_file("backup");
        let first = sample_library();
        let second = vec![Gesture::new("only", vec![Hand::default(); 10])];

        save_gestures(&path, &first).unwrap();
        save_gestures(&path, &second).unwrap();

        assert_eq!(load_gestures(&path).unwrap(), second);
        assert_eq!(load_gestures(&backup_path(&path)).unwrap(), first);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(backup_path(&path));
    }

    #[test]
    fn loading_a_missing_file_is_an_io_error() {
        let path = scratch_file("missing-never-written");
        assert!(matches!(load_gestures(&path), Err(EngineError::Io(_))));
    }

    #[test]
    fn loading_garbage_is_a_format_error() {
        let path = scratch_file("garbage");
        fs::write(&path, b"not json at all").unwrap();
        assert!(matches!(load_gestures(&path), Err(EngineError::Format(_))));
        let _ = fs::remove_file(&path);
    }
}
