// src/printer/printers.rs

//! Materialize and print (signature, count, samples) triples from a
//! [`SigHash`], honoring the requested [`SampleMode`].
//!
//! Signatures print sorted by count descending with an alphabetical
//! subsort; the count column is left-padded to a fixed width.
//!
//! [`SigHash`]: crate::readers::sighash::SigHash

use crate::common::Count;
use crate::readers::sighash::{
    SigHash,
    SigRecord,
};

use std::io::Write;

use ::rand::seq::IndexedRandom;
#[doc(hidden)]
pub use ::termcolor::{
    Color,
    ColorChoice,
    ColorSpec,
    StandardStream,
    WriteColor,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// globals and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Color`] for the count column.
///
/// [`Color`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.Color.html
pub const COLOR_COUNT: Color = Color::Green;

/// Print width of the count column, count plus a trailing colon.
pub const COUNT_WIDTH: usize = 8;

/// In [`SampleMode::Threshold`], counts at or below this print a sample
/// payload instead of the signature.
pub const SAMPLE_THRESHOLD: Count = 3;

/// How a signature record materializes to a display string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SampleMode {
    /// Show the signature itself.
    None,
    /// Show a random sample payload.
    All,
    /// Show the first sample payload when the count is at most
    /// [`SAMPLE_THRESHOLD`], else the signature.
    Threshold,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// materializing and printing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Display text of one record under `mode`.
fn materialize_one<'a>(
    signature: &'a str,
    record: &'a SigRecord,
    mode: SampleMode,
) -> &'a str {
    match mode {
        SampleMode::None => signature,
        SampleMode::All => {
            let mut rng = ::rand::rng();
            // records hold at least one sample so `choose` cannot
            // return `None`
            &record.samples.choose(&mut rng).unwrap().payload
        }
        SampleMode::Threshold => match record.count <= SAMPLE_THRESHOLD {
            true => &record.samples[0].payload,
            false => signature,
        },
    }
}

/// Every record of `sighash` as a (count, display text) pair, sorted by
/// count descending with an alphabetical subsort.
pub fn materialize(
    sighash: &SigHash,
    mode: SampleMode,
) -> Vec<(Count, String)> {
    sighash
        .sorted()
        .into_iter()
        .map(|(signature, record)| {
            (record.count, materialize_one(signature, record, mode).to_string())
        })
        .collect()
}

/// Print the report for `sighash` to STDOUT, count column colored per
/// `color_choice`.
pub fn print_sighash(
    sighash: &SigHash,
    mode: SampleMode,
    color_choice: ColorChoice,
) -> std::io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice);
    for (count, text) in materialize(sighash, mode) {
        stdout.set_color(ColorSpec::new().set_fg(Some(COLOR_COUNT)))?;
        write!(stdout, "{:<width$}", format!("{}:", count), width = COUNT_WIDTH)?;
        stdout.reset()?;
        writeln!(stdout, "{}", text)?;
    }

    stdout.flush()
}
