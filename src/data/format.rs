// src/data/format.rs

//! The closed set of line grammars, [`LogFormat`].
//!
//! Each variant supplies the capability set the classifier and corpus
//! builder rely on:
//! - [`accepts`] — does a whitespace-tokenized line match this grammar?
//!   Pure, never panics on malformed input (malformed is a non-match).
//! - [`parse`] — parse a raw line into an [`Entry`]. Lines below the
//!   grammar's minimum token count fall back to the abnormal or blank
//!   `Entry` shape instead of failing; `None` is returned only when a
//!   structurally-matching line carries a non-numeric date or time field.
//! - [`priority`] — tie-break order during classification; higher wins.
//! - [`quorum`] — the per-grammar predicate deciding whether enough
//!   samples have matched to declare the corpus type.
//!
//! [`accepts`]: LogFormat::accepts
//! [`parse`]: LogFormat::parse
//! [`priority`]: LogFormat::priority
//! [`quorum`]: LogFormat::quorum

use crate::common::Count;
use crate::data::entry::{
    month_number,
    year_now,
    Entry,
};

use std::fmt;

use ::lazy_static::lazy_static;
use ::regex::Regex;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// acceptance predicates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

lazy_static! {
    /// An abbreviated month name, e.g. `"Feb"`.
    static ref RE_MONTH_ABBR: Regex = Regex::new(r"[A-Z][a-z]{2}").unwrap();
    /// A one or two digit day-of-month.
    static ref RE_DAY: Regex = Regex::new(r"[0-9][0-9]?").unwrap();
    /// A wall-clock time, e.g. `"11:53:08"`.
    static ref RE_CLOCK: Regex = Regex::new(r"[0-9]{2}:[0-9]{2}:[0-9]{2}").unwrap();
    /// A PAM module prefix in a secure-auth log, e.g. `"pam_unix(sshd:session):"`.
    static ref RE_PAM: Regex = Regex::new(r"^pam_").unwrap();
    /// An sshd daemon token with pid, e.g. `"sshd[2817]:"`.
    static ref RE_SSHD: Regex = Regex::new(r"^sshd\[").unwrap();
    /// An RSyslog high-precision ISO date prefix, e.g. `"2011-04-04T"`.
    static ref RE_RSYSLOG_DATE: Regex = Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}T").unwrap();
    /// Fractional seconds of an RSyslog high-precision time,
    /// e.g. `"17:56:32.197716"`.
    static ref RE_RSYSLOG_HPTIME: Regex =
        Regex::new(r"[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{6}").unwrap();
    /// An Apache access datetime, e.g. `"03/Aug/2009:11:53:08"`.
    static ref RE_APACHE_ACCESS_DATE: Regex =
        Regex::new(r"[0-9]{2}/[a-zA-Z]{3}/[0-9]{4}:[0-9]{2}:[0-9]{2}:[0-9]{2}").unwrap();
    /// The bracketed day name opening an Apache error datetime,
    /// e.g. `"[Sat"`.
    static ref RE_APACHE_ERROR_DAY: Regex = Regex::new(r"^\[[a-zA-Z]{3}").unwrap();
    /// A four digit year.
    static ref RE_YEAR: Regex = Regex::new(r"[0-9]{4}").unwrap();
    /// A snort alert datetime, e.g. `"09/29-10:18:46.026172"`.
    static ref RE_SNORT_DATE: Regex =
        Regex::new(r"[0-9]{2}/[0-9]{2}\-[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{6}").unwrap();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogFormat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One known line grammar.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LogFormat {
    /// Apache access log, combined format.
    ApacheAccess,
    /// Apache error log, `[Day Mon DD HH:MM:SS YYYY]` datetime.
    ApacheError,
    /// RSyslog with high-precision ISO timestamp.
    Rsyslog,
    /// SSH / PAM secure-auth log. Same line layout as [`Syslog`] but
    /// distinguished so its signatures can be phrase-normalized. High
    /// false-positive overlap with `Syslog` is guarded by a stricter
    /// quorum rule.
    ///
    /// [`Syslog`]: LogFormat::Syslog
    SecureAuth,
    /// Snort-style intrusion-detection alert.
    IntrusionAlert,
    /// Standard BSD syslog, `Mon DD HH:MM:SS host daemon` prefix.
    Syslog,
    /// Any non-empty text. The universal fallback; lowest priority.
    Raw,
}

/// Every [`LogFormat`], in descending [`priority`] order. The classifier
/// and every first-match-wins scan iterate this list.
///
/// [`priority`]: LogFormat::priority
pub const FORMATS: [LogFormat; 7] = [
    LogFormat::ApacheAccess,
    LogFormat::ApacheError,
    LogFormat::Rsyslog,
    LogFormat::SecureAuth,
    LogFormat::IntrusionAlert,
    LogFormat::Syslog,
    LogFormat::Raw,
];

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name: &str = match self {
            LogFormat::ApacheAccess => "apache-access",
            LogFormat::ApacheError => "apache-error",
            LogFormat::Rsyslog => "rsyslog",
            LogFormat::SecureAuth => "secure-auth",
            LogFormat::IntrusionAlert => "intrusion-alert",
            LogFormat::Syslog => "syslog",
            LogFormat::Raw => "raw",
        };

        write!(f, "{}", name)
    }
}

impl LogFormat {
    /// Classification tie-break order; higher wins. [`Raw`] is the lowest,
    /// it matches any non-empty line.
    ///
    /// [`Raw`]: LogFormat::Raw
    pub const fn priority(&self) -> u8 {
        match self {
            LogFormat::ApacheAccess => 70,
            LogFormat::ApacheError => 60,
            LogFormat::Rsyslog => 50,
            LogFormat::SecureAuth => 40,
            LogFormat::IntrusionAlert => 30,
            LogFormat::Syslog => 20,
            LogFormat::Raw => 0,
        }
    }

    /// Does the whitespace-tokenized line match this grammar?
    ///
    /// Pure and panic-free; malformed input is a non-match.
    pub fn accepts(
        &self,
        tokens: &[&str],
    ) -> bool {
        match self {
            LogFormat::ApacheAccess => {
                tokens.len() >= 4 && RE_APACHE_ACCESS_DATE.is_match(tokens[3])
            }
            LogFormat::ApacheError => {
                tokens.len() >= 5
                    && RE_APACHE_ERROR_DAY.is_match(tokens[0])
                    && RE_CLOCK.is_match(tokens[3])
                    && RE_YEAR.is_match(tokens[4])
            }
            LogFormat::Rsyslog => {
                !tokens.is_empty() && RE_RSYSLOG_DATE.is_match(tokens[0])
            }
            LogFormat::SecureAuth => {
                tokens.len() >= 6
                    && RE_DAY.is_match(tokens[1])
                    && RE_CLOCK.is_match(tokens[2])
                    && (RE_PAM.is_match(tokens[5]) || RE_SSHD.is_match(tokens[4]))
            }
            LogFormat::IntrusionAlert => {
                tokens.len() >= 4 && RE_SNORT_DATE.is_match(tokens[0])
            }
            LogFormat::Syslog => {
                tokens.len() >= 6
                    && RE_MONTH_ABBR.is_match(tokens[0])
                    && RE_DAY.is_match(tokens[1])
                    && RE_CLOCK.is_match(tokens[2])
                    && !(RE_PAM.is_match(tokens[5]) || RE_SSHD.is_match(tokens[4]))
            }
            LogFormat::Raw => !tokens.is_empty(),
        }
    }

    /// The per-grammar quorum rule.
    ///
    /// `tally` is this grammar's accumulated sample matches, `threshold`
    /// is one quarter of the sample batch size, `samples_drawn` is the
    /// total number of samples drawn so far. The default rule accepts on
    /// `tally > threshold`. [`SecureAuth`] requires a unanimous match
    /// across every sample drawn, guarding against its overlap with
    /// [`Syslog`].
    ///
    /// [`SecureAuth`]: LogFormat::SecureAuth
    /// [`Syslog`]: LogFormat::Syslog
    pub fn quorum(
        &self,
        tally: Count,
        threshold: f64,
        samples_drawn: Count,
    ) -> bool {
        match self {
            LogFormat::SecureAuth => tally >= samples_drawn,
            _ => (tally as f64) > threshold,
        }
    }

    /// Parse one raw line into an [`Entry`].
    ///
    /// Below the grammar's minimum token count the abnormal or blank
    /// `Entry` shape is returned, so corpus construction never aborts on a
    /// short line. `None` means a date or time field failed integer
    /// conversion; the corpus surfaces that as a fatal per-line error.
    pub fn parse(
        &self,
        line: &str,
    ) -> Option<Entry> {
        match self {
            LogFormat::ApacheAccess => parse_apache_access(line),
            LogFormat::ApacheError => parse_apache_error(line),
            LogFormat::Rsyslog => parse_rsyslog(line),
            LogFormat::SecureAuth => parse_syslog(line),
            LogFormat::IntrusionAlert => parse_snort(line),
            LogFormat::Syslog => parse_syslog(line),
            LogFormat::Raw => parse_raw(line),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// per-grammar parsers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Split a wall-clock token `"HH:MM:SS"` into three integers.
fn parse_clock(clocktime: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = clocktime.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hour: u32 = parts[0].parse().ok()?;
    let minute: u32 = parts[1].parse().ok()?;
    let second: u32 = parts[2].parse().ok()?;

    Some((hour, minute, second))
}

/// `Mon DD HH:MM:SS host daemon payload…`
///
/// Shared by [`LogFormat::Syslog`] and [`LogFormat::SecureAuth`]; their
/// line layout is identical. Syslog records no year so the current year is
/// substituted.
fn parse_syslog(line: &str) -> Option<Entry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Some(fallback_shape(&tokens));
    }

    let month = month_number(tokens[0])?;
    let day: u32 = tokens[1].parse().ok()?;
    let (hour, minute, second) = parse_clock(tokens[2])?;

    Some(Entry {
        year: year_now(),
        month,
        day,
        hour,
        minute,
        second,
        host: tokens[3].to_string(),
        daemon: tokens[4].to_string(),
        payload: tokens[5..].join(" "),
    })
}

/// `YYYY-MM-DDTHH:MM:SS[.ffffff]-TZ host daemon payload…`
fn parse_rsyslog(line: &str) -> Option<Entry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Some(fallback_shape(&tokens));
    }

    // complete major splits: 2010-06-24T17:56:32.197716-04:00
    let (date, rtime) = tokens[0].split_once('T')?;
    // high precision time with timezone offset: 17:56:32.197716-04:00
    let (hptime, _offset) = rtime.split_once('-')?;
    // mixed environments may log without the fractional seconds
    let clocktime: &str = match RE_RSYSLOG_HPTIME.is_match(hptime) {
        true => hptime.split_once('.')?.0,
        false => hptime,
    };

    let date_parts: Vec<&str> = date.split('-').collect();
    if date_parts.len() != 3 {
        return None;
    }
    let year = date_parts[0].parse().ok()?;
    let month: u32 = date_parts[1].parse().ok()?;
    let day: u32 = date_parts[2].parse().ok()?;
    let (hour, minute, second) = parse_clock(clocktime)?;

    Some(Entry {
        year,
        month,
        day,
        hour,
        minute,
        second,
        host: tokens[1].to_string(),
        daemon: tokens[2].to_string(),
        payload: tokens[3..].join(" "),
    })
}

/// Apache access log, combined format.
///
/// Only the request URI and the datetime are kept: the URI doubles as both
/// `host` and `payload`, there is no daemon field.
fn parse_apache_access(line: &str) -> Option<Entry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 12 {
        return Some(fallback_shape(&tokens));
    }

    let apachedate: &str = tokens[3];
    let uri: &str = tokens[6];

    // split up something that looks like this: [03/Aug/2009:11:53:08
    let datetime_parts: Vec<&str> = apachedate.split(':').collect();
    if datetime_parts.len() < 4 {
        return None;
    }
    let hour: u32 = datetime_parts[1].parse().ok()?;
    let minute: u32 = datetime_parts[2].parse().ok()?;
    let second: u32 = datetime_parts[3].parse().ok()?;

    let dmy: Vec<&str> = datetime_parts[0].split('/').collect();
    if dmy.len() != 3 {
        return None;
    }
    let day: u32 = dmy[0].trim_start_matches('[').parse().ok()?;
    let month = month_number(dmy[1])?;
    let year = dmy[2].parse().ok()?;

    Some(Entry {
        year,
        month,
        day,
        hour,
        minute,
        second,
        host: uri.to_string(),
        daemon: String::from(crate::common::SCRUB_CHAR),
        payload: uri.to_string(),
    })
}

/// `[Day Mon DD HH:MM:SS YYYY] payload…`
fn parse_apache_error(line: &str) -> Option<Entry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Some(fallback_shape(&tokens));
    }

    let month = month_number(tokens[1])?;
    let day: u32 = tokens[2].parse().ok()?;
    let (hour, minute, second) = parse_clock(tokens[3])?;
    let year = tokens[4].replace(']', "").parse().ok()?;

    Some(Entry {
        year,
        month,
        day,
        hour,
        minute,
        second,
        host: String::from(crate::common::SCRUB_CHAR),
        daemon: String::from(crate::common::SCRUB_CHAR),
        payload: tokens[5..].join(" "),
    })
}

/// `MM/DD-HH:MM:SS.ffffff payload…` (snort alert)
///
/// Snort records no year so the current year is substituted.
fn parse_snort(line: &str) -> Option<Entry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Some(fallback_shape(&tokens));
    }

    // looks like "09/29-10:18:46.026172"
    let (snortdate, _fractional) = tokens[0].split_once('.')?;
    // looks like "09/29-10:18:46"
    let (month, snortdate) = snortdate.split_once('/')?;
    // looks like "29-10:18:46"
    let (day, clocktime) = snortdate.split_once('-')?;

    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let (hour, minute, second) = parse_clock(clocktime)?;

    Some(Entry {
        year: year_now(),
        month,
        day,
        hour,
        minute,
        second,
        host: String::from(crate::common::SCRUB_CHAR),
        daemon: String::from(crate::common::SCRUB_CHAR),
        payload: tokens[1..].join(" "),
    })
}

/// Raw text; the entire line becomes the payload of an abnormal-shaped
/// `Entry` so raw logs carry all of the common fields and can be worked
/// with like any other entries.
fn parse_raw(line: &str) -> Option<Entry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    Some(fallback_shape(&tokens))
}

/// The shape shared by every grammar for lines below its minimum token
/// count.
fn fallback_shape(tokens: &[&str]) -> Entry {
    match tokens.is_empty() {
        true => Entry::blank(),
        false => Entry::abnormal(tokens),
    }
}
