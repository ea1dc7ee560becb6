// src/data/entry.rs

//! An [`Entry`] is one parsed log line, structurally normalized.
//!
//! Every line grammar of [`LogFormat`] produces this exact shape; it is the
//! contract the signature aggregator depends on. Grammars that cannot
//! extract a field store the placeholder [`SCRUB_CHAR`].
//!
//! [`LogFormat`]: crate::data::format::LogFormat
//! [`SCRUB_CHAR`]: crate::common::SCRUB_CHAR

use crate::common::{
    SCRUB_CHAR,
    Year,
};

use ::chrono::Datelike;
use ::phf::phf_map;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// month names
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A calendar month as a number 1–12.
pub type MonthNum = u32;

/// Map of lowercased abbreviated English month name to month number.
static MONTH_NUMBERS: phf::Map<&'static str, MonthNum> = phf_map! {
    "jan" => 1,
    "feb" => 2,
    "mar" => 3,
    "apr" => 4,
    "may" => 5,
    "jun" => 6,
    "jul" => 7,
    "aug" => 8,
    "sep" => 9,
    "oct" => 10,
    "nov" => 11,
    "dec" => 12,
};

/// Map an abbreviated English month name, any case, to 1–12.
/// `None` for anything else.
pub fn month_number(name: &str) -> Option<MonthNum> {
    let lower: String = name.to_ascii_lowercase();

    MONTH_NUMBERS.get(lower.as_str()).copied()
}

/// The current year in the local timezone.
///
/// Substituted for log formats that do not record a year
/// (syslog, secure-auth, snort).
pub fn year_now() -> Year {
    ::chrono::Local::now().year()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Entry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Timestamp fields of the abnormal/blank `Entry` shape.
const TIMESTAMP_ABNORMAL: (Year, u32, u32, u32, u32, u32) = (1900, 1, 1, 1, 1, 1);

/// One parsed log line.
///
/// Created once during corpus parsing and immutable thereafter, with one
/// exception: fingerprint suppression relabels the `payload` of a single
/// sample entry ([`Fingerprint::apply`]).
///
/// [`Fingerprint::apply`]: crate::readers::fingerprint::Fingerprint#method.apply
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub year: Year,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Originating host, [`SCRUB_CHAR`] if the grammar has no host field.
    pub host: String,
    /// Source process ("daemon"), [`SCRUB_CHAR`] if the grammar has no
    /// daemon field.
    pub daemon: String,
    /// Free-text remainder of the line, [`SCRUB_CHAR`] if the line was
    /// blank.
    pub payload: String,
}

impl Entry {
    /// The "abnormal" fallback shape: a line with at least one token that
    /// does not fit its grammar. The whole tokenized line becomes the
    /// payload.
    pub fn abnormal(tokens: &[&str]) -> Entry {
        let (year, month, day, hour, minute, second) = TIMESTAMP_ABNORMAL;

        Entry {
            year,
            month,
            day,
            hour,
            minute,
            second,
            host: String::from(SCRUB_CHAR),
            daemon: String::from(SCRUB_CHAR),
            payload: tokens.join(" "),
        }
    }

    /// The "blank" fallback shape: a line with zero tokens. The payload is
    /// the placeholder; the cleanup pass of the aggregator will drop its
    /// signature.
    pub fn blank() -> Entry {
        let (year, month, day, hour, minute, second) = TIMESTAMP_ABNORMAL;

        Entry {
            year,
            month,
            day,
            hour,
            minute,
            second,
            host: String::from(SCRUB_CHAR),
            daemon: String::from(SCRUB_CHAR),
            payload: String::from(SCRUB_CHAR),
        }
    }
}
