// src/readers/filter.rs

//! A [`Filter`] is an ordered list of compiled regular expressions loaded
//! from a named "stopwords" resource. [`scrub`] replaces every match of
//! every pattern with the placeholder [`SCRUB_CHAR`], normalizing variable
//! data (timestamps, pids, addresses) out of signature keys.
//!
//! Resource resolution is a prioritized directory search — the
//! installation path [`FILTER_DIR_INSTALL`], then the package-relative
//! [`FILTER_DIR_PACKAGE`] — and the first existing, non-empty resource
//! wins. A name found nowhere yields an inert `Filter` whose `scrub` is
//! the identity.
//!
//! [`scrub`]: Filter::scrub
//! [`SCRUB_CHAR`]: crate::common::SCRUB_CHAR

use crate::common::{
    FPath,
    ProcessingError,
    ResultSift,
    SCRUB_CHAR,
};
use crate::readers::helpers::fpath_join;

use ::const_format::concatcp;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// resource locations and names
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Installation-wide resource directory.
pub const PRECEDING_DIR: &str = "/var/lib/logsift";

/// First directory searched for filter resources.
pub const FILTER_DIR_INSTALL: &str = concatcp!(PRECEDING_DIR, "/filters");

/// Second directory searched for filter resources; the resources shipped
/// with this package.
pub const FILTER_DIR_PACKAGE: &str = concatcp!(env!("CARGO_MANIFEST_DIR"), "/resources/filters");

/// Stopwords resource for the signature report (and for fingerprint
/// reference corpora).
pub const STOPWORDS_HASH: &str = "hash.stopwords";
/// Stopwords resource for the daemon report.
pub const STOPWORDS_DAEMON: &str = "daemon.stopwords";
/// Stopwords resource for the host report.
pub const STOPWORDS_HOST: &str = "host.stopwords";
/// Stopwords resource for the word-frequency report.
pub const STOPWORDS_WORDS: &str = "words.stopwords";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Filter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An ordered list of scrub patterns, loaded once, immutable after load.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// The resource file the patterns came from, `None` for an inert or
    /// in-memory filter.
    path: Option<FPath>,
    /// Compiled patterns in resource file order. Order matters: each
    /// pattern substitutes into the previous pattern's output.
    stopwords: Vec<Regex>,
}

impl Filter {
    /// The inert filter: no patterns, [`scrub`] is the identity.
    ///
    /// [`scrub`]: Filter::scrub
    pub fn new() -> Filter {
        Filter::default()
    }

    /// Load the named resource from the prioritized directory search:
    /// every directory of `extra_dirs` in order, then
    /// [`FILTER_DIR_INSTALL`], then [`FILTER_DIR_PACKAGE`].
    /// The first existing, non-empty resource wins. A name found nowhere
    /// yields the inert filter.
    pub fn load(
        name: &str,
        extra_dirs: &[FPath],
    ) -> ResultSift<Filter> {
        defn!("({:?}, {:?})", name, extra_dirs);
        for dir in extra_dirs
            .iter()
            .map(|fpath| fpath.as_str())
            .chain([FILTER_DIR_INSTALL, FILTER_DIR_PACKAGE])
        {
            let path: FPath = fpath_join(dir, name);
            match std::fs::metadata(&path) {
                Ok(metadata) if metadata.len() > 0 => {
                    defx!("found {:?}", path);
                    return Filter::from_path(&path);
                }
                _ => {}
            }
        }
        defx!("no resource {:?} found, inert filter", name);

        Ok(Filter::new())
    }

    /// Load patterns from one resource file, one regular expression per
    /// line. An unreadable file, or a line that does not compile, is
    /// fatal.
    pub fn from_path(path: &FPath) -> ResultSift<Filter> {
        let contents: String = std::fs::read_to_string(path)
            .map_err(|err| ProcessingError::ResourceUnreadable(path.clone(), err.to_string()))?;

        let mut stopwords: Vec<Regex> = Vec::new();
        for line in contents.lines() {
            let pattern: &str = line.trim_end();
            if pattern.is_empty() {
                continue;
            }
            let stopword: Regex = Regex::new(pattern).map_err(|err| {
                ProcessingError::ResourceUnreadable(path.clone(), err.to_string())
            })?;
            stopwords.push(stopword);
        }

        Ok(Filter {
            path: Some(path.clone()),
            stopwords,
        })
    }

    /// Build a filter from in-memory patterns; the in-code counterpart of
    /// [`from_path`] for callers that assemble their own pattern list.
    ///
    /// [`from_path`]: Filter::from_path
    pub fn from_patterns(patterns: &[&str]) -> ResultSift<Filter> {
        let mut stopwords: Vec<Regex> = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let stopword: Regex = Regex::new(pattern).map_err(|err| {
                ProcessingError::ResourceUnreadable(FPath::from(*pattern), err.to_string())
            })?;
            stopwords.push(stopword);
        }

        Ok(Filter {
            path: None,
            stopwords,
        })
    }

    /// Replace every match of every pattern with [`SCRUB_CHAR`].
    ///
    /// Patterns apply sequentially in resource file order; each pattern
    /// substitutes into the previous pattern's output, so resource
    /// content controls substitution order.
    ///
    /// [`SCRUB_CHAR`]: crate::common::SCRUB_CHAR
    pub fn scrub(
        &self,
        input: &str,
    ) -> String {
        let mut scrubbed: String = input.to_string();
        for stopword in &self.stopwords {
            scrubbed = stopword
                .replace_all(&scrubbed, SCRUB_CHAR)
                .into_owned();
        }

        scrubbed
    }

    /// The resource file this filter was loaded from, if any.
    pub fn path(&self) -> Option<&FPath> {
        self.path.as_ref()
    }

    /// Number of loaded patterns.
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    /// An inert filter scrubs nothing.
    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}
