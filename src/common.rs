// src/common.rs
//
// common type aliases, the scrub placeholder, and the error taxonomy
// (avoids circular imports)

use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling, counting
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;
pub type FPaths = Vec<FPath>;
/// A file size in bytes.
pub type FileSz = u64;
/// A count of anything.
pub type Count = u64;
/// A gregorian calendar year, as [`chrono`] defines one.
///
/// [`chrono`]: https://docs.rs/chrono/latest/chrono/trait.Datelike.html#tymethod.year
pub type Year = i32;
/// A 1-based line number within a corpus.
pub type LineNum = usize;

/// The character every scrubbed substring is replaced with, and the
/// placeholder for absent [`Entry`] fields.
///
/// [`Entry`]: crate::data::entry::Entry
pub const SCRUB_CHAR: &str = "#";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// error taxonomy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Every fatal failure category of the processing pipeline.
///
/// Each variant maps to a distinct, stable exit status via
/// [`exit_code`] so the driver binary can report a specific diagnostic.
///
/// [`exit_code`]: ProcessingError::exit_code
#[derive(Debug)]
pub enum ProcessingError {
    /// The corpus had zero lines.
    NoInputData,
    /// A line matched a grammar structurally but a date or time field
    /// would not convert to an integer. Holds the 1-based line number.
    CannotParseLine(LineNum),
    /// Fingerprinting was requested but no `.fp` files were found in any
    /// searched directory. Holds the directories searched.
    NoFingerprints(FPaths),
    /// No grammar reached quorum; the corpus format cannot be determined.
    UndeterminableFormat,
    /// A filter resource exists but could not be read, or a line of it did
    /// not compile as a regular expression.
    ResourceUnreadable(FPath, String),
}

impl ProcessingError {
    /// The stable exit status for this failure category.
    pub const fn exit_code(&self) -> u8 {
        match self {
            ProcessingError::NoInputData => 11,
            ProcessingError::CannotParseLine(_) => 13,
            ProcessingError::NoFingerprints(_) => 14,
            ProcessingError::UndeterminableFormat => 15,
            ProcessingError::ResourceUnreadable(..) => 16,
        }
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ProcessingError::NoInputData => write!(f, "no data found"),
            ProcessingError::CannotParseLine(linenum) => {
                write!(f, "cannot parse values on line {}", linenum)
            }
            ProcessingError::NoFingerprints(dirs) => {
                write!(f, "could not locate fingerprint files in directories {:?}", dirs)
            }
            ProcessingError::UndeterminableFormat => {
                write!(f, "could not determine the log format of the corpus")
            }
            ProcessingError::ResourceUnreadable(path, cause) => {
                write!(f, "cannot read resource {:?}: {}", path, cause)
            }
        }
    }
}

impl std::error::Error for ProcessingError {}

/// Shorthand [`Result`] for pipeline operations.
pub type ResultSift<T> = std::result::Result<T, ProcessingError>;
