// src/readers/corpus.rs

//! A [`Corpus`] is the full ordered set of input lines for one run,
//! materialized in memory, classified once, and parsed into [`Entry`]s
//! with the winning grammar.
//!
//! The whole corpus is read before classification begins: the classifier
//! needs random access for sampling, so there is no streaming mode.
//!
//! [`Entry`]: crate::data::entry::Entry

use crate::common::{
    FPath,
    ProcessingError,
    ResultSift,
};
use crate::data::entry::Entry;
use crate::data::format::LogFormat;
use crate::readers::classifier::classify;

use std::io::BufRead;

use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

/// User-passed signifier that the corpus is read from STDIN.
pub const CORPUS_ON_STDIN: &str = "-";

/// Read newline-delimited text from a file path, or from STDIN when the
/// path is [`CORPUS_ON_STDIN`].
pub fn read_lines(path: &FPath) -> std::io::Result<Vec<String>> {
    defn!("({:?})", path);
    let lines: Vec<String> = match path.as_str() {
        CORPUS_ON_STDIN => {
            let stdin = std::io::stdin();
            stdin
                .lock()
                .lines()
                .collect::<std::io::Result<Vec<String>>>()?
        }
        _ => {
            let file = std::fs::File::open(path)?;
            std::io::BufReader::new(file)
                .lines()
                .collect::<std::io::Result<Vec<String>>>()?
        }
    };
    defx!("{} lines", lines.len());

    Ok(lines)
}

/// The parsed corpus: every line as an [`Entry`], all of one
/// [`LogFormat`].
///
/// [`Entry`]: crate::data::entry::Entry
/// [`LogFormat`]: crate::data::format::LogFormat
#[derive(Clone, Debug)]
pub struct Corpus {
    entries: Vec<Entry>,
    format: LogFormat,
}

impl Corpus {
    /// Classify `lines` then parse every line with the winning grammar.
    ///
    /// Zero lines is fatal ("no data found"). A line whose date or time
    /// fields will not convert is fatal with its 1-based line number.
    pub fn from_lines(lines: Vec<String>) -> ResultSift<Corpus> {
        defn!("({} lines)", lines.len());
        if lines.is_empty() {
            defx!("return NoInputData");
            return Err(ProcessingError::NoInputData);
        }
        let format: LogFormat = classify(&lines)?;
        defx!("classified {}", format);

        Corpus::parse_with(&lines, format)
    }

    /// Parse every line with a known grammar, skipping classification.
    pub fn parse_with(
        lines: &[String],
        format: LogFormat,
    ) -> ResultSift<Corpus> {
        let mut entries: Vec<Entry> = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            match format.parse(line) {
                Some(entry) => entries.push(entry),
                None => return Err(ProcessingError::CannotParseLine(index + 1)),
            }
        }

        Ok(Corpus { entries, format })
    }

    /// The grammar every entry was parsed with.
    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new `Corpus` holding only the entries whose payload matches
    /// `pattern`.
    pub fn subset(
        &self,
        pattern: &Regex,
    ) -> Corpus {
        let entries: Vec<Entry> = self
            .entries
            .iter()
            .filter(|entry| pattern.is_match(&entry.payload))
            .cloned()
            .collect();

        Corpus {
            entries,
            format: self.format,
        }
    }
}
