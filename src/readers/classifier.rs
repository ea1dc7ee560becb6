// src/readers/classifier.rs

//! Blind format detection: decide, from an unclassified corpus and no
//! external metadata, which single [`LogFormat`] will parse every line.
//!
//! The algorithm is statistical sampling with quorum voting: draw random
//! lines **with replacement** in batches of [`SAMPLE_BATCH_SZ`], test each
//! sample against every grammar in descending priority order
//! (first match wins), and accumulate per-grammar tallies. After each
//! batch, evaluate each grammar's quorum rule in priority order and return
//! the first grammar that satisfies its rule. Tallies persist across
//! batches; they are never reset.
//!
//! Because sampling is randomized, classification is **not deterministic**
//! across runs on ambiguous corpora. Tests use homogeneous fixtures.
//!
//! [`LogFormat`]: crate::data::format::LogFormat

use crate::common::{
    Count,
    ProcessingError,
    ResultSift,
};
use crate::data::format::{
    LogFormat,
    FORMATS,
};

use std::collections::HashMap;

use ::rand::seq::IndexedRandom;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// sampling parameters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Number of lines drawn per sampling batch.
pub const SAMPLE_BATCH_SZ: usize = 10;

/// The default quorum threshold, one quarter of the batch size. The
/// default quorum rule accepts a grammar whose tally strictly exceeds
/// this.
pub const TALLY_THRESHOLD: f64 = SAMPLE_BATCH_SZ as f64 / 4.0;

/// Upper bound on sampling batches. Sampling converges almost surely
/// because [`Raw`] accepts any non-empty line, but a corpus of only blank
/// lines tallies nothing, so the loop must be bounded.
///
/// [`Raw`]: crate::data::format::LogFormat#variant.Raw
pub const BATCHES_MAX: usize = 100;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tally
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-grammar vote counts accumulated over every batch drawn so far.
#[derive(Debug, Default)]
pub struct Tally {
    matrix: HashMap<LogFormat, Count>,
}

impl Tally {
    pub fn new() -> Tally {
        Tally::default()
    }

    /// Record one sample match for `format`.
    pub fn append(
        &mut self,
        format: LogFormat,
    ) {
        *self.matrix.entry(format).or_insert(0) += 1;
    }

    /// The accumulated tally for `format`.
    pub fn get(
        &self,
        format: LogFormat,
    ) -> Count {
        self.matrix.get(&format).copied().unwrap_or(0)
    }

    /// Sum of all tallies.
    pub fn total(&self) -> Count {
        self.matrix.values().sum()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// classification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Determine the [`LogFormat`] of `lines` by sampling and quorum voting.
///
/// On batch exhaustion ([`BATCHES_MAX`]) the classification falls back
/// deterministically to [`Raw`] if anything at all matched a grammar;
/// a corpus whose every sample tokenized to nothing is undeterminable.
///
/// [`LogFormat`]: crate::data::format::LogFormat
/// [`Raw`]: crate::data::format::LogFormat#variant.Raw
pub fn classify(lines: &[String]) -> ResultSift<LogFormat> {
    defn!("({} lines)", lines.len());
    if lines.is_empty() {
        defx!("return NoInputData");
        return Err(ProcessingError::NoInputData);
    }

    let mut rng = ::rand::rng();
    let mut tally = Tally::new();
    let mut samples_drawn: Count = 0;

    for _batch in 0..BATCHES_MAX {
        // draw one batch of samples, with replacement
        for _ in 0..SAMPLE_BATCH_SZ {
            // `lines` is non-empty so `choose` cannot return `None`
            let line: &String = lines.choose(&mut rng).unwrap();
            let tokens: Vec<&str> = line.split_whitespace().collect();
            samples_drawn += 1;

            // first grammar to accept the sample wins the vote
            for format in FORMATS.iter() {
                if format.accepts(&tokens) {
                    tally.append(*format);
                    break;
                }
            }
        }

        // quorum rules are evaluated in priority order
        for format in FORMATS.iter() {
            if format.quorum(tally.get(*format), TALLY_THRESHOLD, samples_drawn) {
                defx!("determined {} tally {}", format, tally.get(*format));
                return Ok(*format);
            }
        }
        defo!("batch {} no quorum, tallies {:?}", _batch, tally);
    }

    if tally.total() > 0 {
        defx!("batches exhausted, fall back to raw");
        return Ok(LogFormat::Raw);
    }
    defx!("return UndeterminableFormat");

    Err(ProcessingError::UndeterminableFormat)
}
