//! Brightness/contrast parameter file.
//!
//! Two lines, brightness then contrast, each a decimal integer. Other
//! programs on the board poll this file to pick up the current values.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Missing {0} line")]
    Missing(&'static str),
    #[error("Malformed {field} value: {content:?}")]
    Malformed { field: &'static str, content: String },
}

pub fn save_parameters<P: AsRef<Path>>(path: P, brightness: i32, contrast: i32) -> Result<(), ParamsError> {
    std::fs::write(path, format!("{}\n{}\n", brightness, contrast))?;
    Ok(())
}

/// Read `(brightness, contrast)` back.
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<(i32, i32), ParamsError> {
    let content = std::fs::read_to_string(path)?;
    let mut lines = content.lines();
    let brightness = parse_line(lines.next(), "brightness")?;
    let contrast = parse_line(lines.next(), "contrast")?;
    Ok((brightness, contrast))
}

fn parse_line(line: Option<&str>, field: &'static str) -> Result<i32, ParamsError> {
    let line = line.ok_or(ParamsError::Missing(field))?.trim();
    line.parse().map_err(|_| ParamsError::Malformed {
        field,
        content: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("hexlink-params-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_save_format() {
        let path = temp_path("save");
        save_parameters(&path, -12, 87).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "-12\n87\n");
        assert_eq!(load_parameters(&path).unwrap(), (-12, 87));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = temp_path("garbage");
        std::fs::write(&path, "10\nabc\n").unwrap();
        assert!(matches!(
            load_parameters(&path),
            Err(ParamsError::Malformed { field: "contrast", .. })
        ));
        std::fs::write(&path, "10").unwrap();
        assert!(matches!(load_parameters(&path), Err(ParamsError::Missing("contrast"))));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_parameters(temp_path("absent")),
            Err(ParamsError::Io(_))
        ));
    }
}
