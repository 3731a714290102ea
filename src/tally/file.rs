use std::fs;
use std::path::Path;

use tracing::info;

use super::WordCount;
use crate::core::TallyError;

/// Tally `input` and write the rendered counts to `output`.
///
/// `output` is created or overwritten; `input` is only read. Nothing is
/// written if the input cannot be read or is not UTF-8.
pub fn tally_file(input: &Path, output: &Path) -> Result<WordCount, TallyError> {
    info!("Processing file: {}", input.display());

    let bytes = fs::read(input).map_err(|source| TallyError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let text = std::str::from_utf8(&bytes).map_err(|e| TallyError::InvalidEncoding {
        path: input.to_path_buf(),
        offset: e.valid_up_to(),
    })?;

    let counts = WordCount::from_text(text);
    fs::write(output, counts.render()).map_err(|source| TallyError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    info!(
        "File processed ({} distinct tokens). Results saved to: {}",
        counts.len(),
        output.display()
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_file_writes_result() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        fs::write(&input, "usa india usa nepal india pakistan .").unwrap();

        let counts = tally_file(&input, &output).unwrap();

        assert_eq!(counts.len(), 4);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "usa-2\nindia-2\nnepal-1\npakistan-1\n"
        );
        // Input is left untouched.
        assert_eq!(
            fs::read_to_string(&input).unwrap(),
            "usa india usa nepal india pakistan ."
        );
    }

    #[test]
    fn test_tally_file_overwrites_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        fs::write(&input, "one one").unwrap();
        fs::write(&output, "stale content that is much longer than the result\n").unwrap();

        tally_file(&input, &output).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "one-2\n");
    }

    #[test]
    fn test_tally_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.txt");

        let err = tally_file(&dir.path().join("absent.txt"), &output).unwrap_err();

        assert!(matches!(err, TallyError::Io { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_tally_file_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        fs::write(&input, [b'o', b'k', b' ', 0xff, 0xfe]).unwrap();

        let err = tally_file(&input, &output).unwrap_err();

        assert!(matches!(err, TallyError::InvalidEncoding { offset: 3, .. }));
        assert!(!output.exists());
    }
}
