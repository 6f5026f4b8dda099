//! Tolerant reader for boundary scalar-list field files
//!
//! Field files written by the solver carry a `FoamFile` header, a dictionary
//! preamble and one or more `nonuniform List<scalar>` blocks. Only the first
//! list is read:
//!
//! ```text
//! FoamFile { ... }
//! 24
//! (
//! 12.5
//! 13.1
//! )
//! ```
//!
//! Formatting varies by writer version and field type, so a line inside the
//! list that is not a single number is skipped instead of failing the read.

use crate::error::PostError;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Field written by the `wallHeatTransferCoeff` function object
pub const DEFAULT_FIELD_NAME: &str = "wallHeatTransferCoeff";

const LIST_OPEN: &[u8] = b"(";
const LIST_CLOSE: &[u8] = b")";

/// Position of the reader relative to the scalar list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Header and metadata, ignored verbatim
    BeforeList,
    /// Between `(` and `)`, one scalar per line
    InList,
    /// `)` seen, remaining lines ignored
    Done,
}

/// Parse the first `(` ... `)` scalar list from a line-oriented reader.
///
/// Lines are handled as raw bytes, so header text in any encoding is
/// skipped. A list line that is not UTF-8 or not a number is dropped.
///
/// Returns the parsed values in file order. The result is empty when the
/// reader has no list or the list holds no parsable line.
///
/// # Errors
/// Returns the underlying I/O error if a line cannot be read.
pub fn parse_scalar_list<R: BufRead>(reader: R) -> io::Result<Vec<f64>> {
    let mut state = ParseState::BeforeList;
    let mut values = Vec::new();

    for line in reader.split(b'\n') {
        let line = line?;
        let trimmed = line.trim_ascii();
        state = match state {
            ParseState::BeforeList if trimmed == LIST_OPEN => ParseState::InList,
            ParseState::BeforeList => ParseState::BeforeList,
            ParseState::InList if trimmed == LIST_CLOSE => ParseState::Done,
            ParseState::InList => {
                if let Some(value) = parse_scalar(trimmed) {
                    values.push(value);
                }
                ParseState::InList
            }
            ParseState::Done => ParseState::Done,
        };
        if state == ParseState::Done {
            break;
        }
    }

    Ok(values)
}

fn parse_scalar(bytes: &[u8]) -> Option<f64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Read `field_name` inside a snapshot directory.
///
/// Returns `Ok(None)` when the file does not exist, which is normal for early
/// snapshots written before the field was computed.
///
/// # Errors
/// Returns [`PostError::FieldRead`] if the file exists but cannot be read.
pub fn read_field_file(snapshot_dir: &Path, field_name: &str) -> Result<Option<Vec<f64>>, PostError> {
    let path = snapshot_dir.join(field_name);
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(PostError::FieldRead { path, source }),
    };

    parse_scalar_list(BufReader::new(file))
        .map(Some)
        .map_err(|source| PostError::FieldRead { path, source })
}
