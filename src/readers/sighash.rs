// src/readers/sighash.rs

//! The signature aggregator [`SigHash`]: a mapping from normalized
//! signature to [`SigRecord`], built from a parsed [`Corpus`] with a
//! per-grammar key-extraction rule and a caller-supplied [`Filter`].
//!
//! Key extraction per grammar family:
//!
//! | family | key source |
//! |---|---|
//! | syslog-like (syslog, rsyslog) | `daemon + " " + payload` |
//! | secure-auth | like syslog-like, phrase-normalized first |
//! | apache / intrusion-alert / raw | `payload` |
//! | daemon report | `daemon` |
//! | host report | `host` |
//! | word frequency | every whitespace token of `payload` |
//!
//! After filling, a cleanup pass removes signatures whose characters are
//! all drawn from `{#, [, ], (, ), :}` — dates and numbers fully
//! scrubbed, nothing textual left.
//!
//! [`Corpus`]: crate::readers::corpus::Corpus
//! [`Filter`]: crate::readers::filter::Filter

use crate::common::Count;
use crate::data::entry::Entry;
use crate::data::format::LogFormat;
use crate::readers::corpus::Corpus;
use crate::readers::filter::Filter;

use std::collections::btree_map;
use std::collections::BTreeMap;

use ::lazy_static::lazy_static;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// secure-auth phrase normalization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

lazy_static! {
    /// The fixed catalogue of auth-log phrases substituted to their
    /// generic form before filter scrubbing. Order matters: the
    /// invalid-user forms run before the `from`-preserving forms so the
    /// latter cannot re-collapse them.
    static ref SECURE_PHRASES: Vec<(Regex, &'static str)> = vec![
        // session entries
        (Regex::new("session closed for.*").unwrap(), "session closed for #"),
        (Regex::new("session opened for.*").unwrap(), "session opened for #"),
        // auth entries
        (Regex::new("Accepted publickey for.*from.*").unwrap(), "Accepted publickey for # from #"),
        (Regex::new("Accepted password for.*from.*").unwrap(), "Accepted password for # from #"),
        (Regex::new("Postponed publickey for.*").unwrap(), "Postponed publickey for #"),
        (Regex::new("input_userauth_request: invalid user.*").unwrap(), "input_userauth_request: invalid user #"),
        (Regex::new("Invalid user.*").unwrap(), "Invalid user #"),
        (Regex::new("reverse mapping checking getaddrinfo for.*").unwrap(), "reverse mapping checking getaddrinfo for #"),
        (Regex::new("Connection closed by.*").unwrap(), "Connection closed by #"),
        (Regex::new("Failed password for invalid user.*").unwrap(), "Failed password for invalid user #"),
        (Regex::new("Failed password for.*from.*").unwrap(), "Failed password for # from #"),
        (Regex::new("error retrieving information about user.*").unwrap(), "error retrieving information about user #"),
        (Regex::new("authentication failure.*").unwrap(), "authentication failure #"),
        // misc
        (Regex::new("Received disconnect from.*").unwrap(), "Received disconnect from #"),
        (Regex::new("Could not reverse map address.*").unwrap(), "Could not reverse map address #"),
    ];

    /// The `[pid]:` decoration trailing a secure-auth daemon token,
    /// e.g. `"sshd[2817]:"` → `"sshd"`.
    static ref SECURE_DAEMON_TRIM: Regex = Regex::new(r"(\[[0-9]+\])?:?$").unwrap();
}

/// Substitute known auth-log phrases to their generic form.
fn normalize_secure_payload(payload: &str) -> String {
    let mut normalized: String = payload.to_string();
    for (phrase, generic) in SECURE_PHRASES.iter() {
        normalized = phrase
            .replace_all(&normalized, *generic)
            .into_owned();
    }

    normalized
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SigRecord, SigHash
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One signature's record: its occurrence count and the originating
/// entries, in first-seen order.
///
/// A record is never observable with `count == 0`: creation always
/// accompanies the first [`increment`].
///
/// [`increment`]: SigHash::increment
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SigRecord {
    pub count: Count,
    /// Unscrubbed originating entries, kept for sample display. Samples
    /// accumulate unboundedly; bounded only by corpus size.
    pub samples: Vec<Entry>,
}

/// Mapping from normalized signature to [`SigRecord`].
///
/// Owns the [`Filter`] every key is scrubbed through; callers construct
/// the filter explicitly (possibly [`Filter::new`], the inert one).
///
/// [`Filter`]: crate::readers::filter::Filter
/// [`Filter::new`]: crate::readers::filter::Filter#method.new
#[derive(Debug, Default)]
pub struct SigHash {
    records: BTreeMap<String, SigRecord>,
    filter: Filter,
}

impl SigHash {
    /// An empty aggregator scrubbing through `filter`.
    pub fn new(filter: Filter) -> SigHash {
        SigHash {
            records: BTreeMap::new(),
            filter,
        }
    }

    /// Build the signature aggregator for a parsed corpus, selecting the
    /// key-extraction rule from the corpus grammar.
    pub fn from_corpus(
        corpus: &Corpus,
        filter: Filter,
    ) -> SigHash {
        defn!("({} entries, format {})", corpus.len(), corpus.format());
        let mut sighash = SigHash::new(filter);
        match corpus.format() {
            LogFormat::Syslog | LogFormat::Rsyslog => sighash.fill_syslog(corpus),
            LogFormat::SecureAuth => sighash.fill_secure(corpus),
            LogFormat::ApacheAccess
            | LogFormat::ApacheError
            | LogFormat::IntrusionAlert
            | LogFormat::Raw => sighash.fill_payload(corpus),
        }
        sighash.cleanup();
        defx!("{} signatures", sighash.len());

        sighash
    }

    /// Build the daemon report: each entry keyed by its daemon alone.
    pub fn of_daemons(
        corpus: &Corpus,
        filter: Filter,
    ) -> SigHash {
        let mut sighash = SigHash::new(filter);
        for entry in corpus.entries() {
            let key: String = sighash.filter.scrub(&entry.daemon);
            sighash.increment(&key, entry.clone());
        }
        sighash.cleanup();

        sighash
    }

    /// Build the host report: each entry keyed by its host alone.
    pub fn of_hosts(
        corpus: &Corpus,
        filter: Filter,
    ) -> SigHash {
        let mut sighash = SigHash::new(filter);
        for entry in corpus.entries() {
            let key: String = sighash.filter.scrub(&entry.host);
            sighash.increment(&key, entry.clone());
        }
        sighash.cleanup();

        sighash
    }

    /// Build the word-frequency report: every whitespace token of every
    /// payload is its own key.
    ///
    /// Words are counted unscrubbed first, then every word is re-keyed
    /// through the filter in one bulk pass, merging records whose words
    /// scrub to the same result. One bulk pass is far cheaper than
    /// scrubbing on every insert.
    pub fn of_words(
        corpus: &Corpus,
        filter: Filter,
    ) -> SigHash {
        let mut sighash = SigHash::new(filter);
        for entry in corpus.entries() {
            for word in entry.payload.split_whitespace() {
                sighash.increment(word, entry.clone());
            }
        }

        let words: Vec<String> = sighash.records.keys().cloned().collect();
        for word in words {
            let scrubbed: String = sighash.filter.scrub(&word);
            if scrubbed == word {
                continue;
            }
            let record: SigRecord = match sighash.records.remove(&word) {
                Some(val) => val,
                None => continue,
            };
            match sighash.records.get_mut(&scrubbed) {
                Some(merged) => {
                    merged.count += record.count;
                    merged.samples.extend(record.samples);
                }
                None => {
                    sighash.records.insert(scrubbed, record);
                }
            }
        }
        sighash.cleanup();

        sighash
    }

    /// syslog-like family: key is `daemon + " " + payload`, scrubbed.
    fn fill_syslog(
        &mut self,
        corpus: &Corpus,
    ) {
        for entry in corpus.entries() {
            let key: String = self
                .filter
                .scrub(&format!("{} {}", entry.daemon, entry.payload));
            self.increment(&key, entry.clone());
        }
    }

    /// secure-auth: phrase-normalize the payload and strip the daemon's
    /// `[pid]:` decoration before scrubbing.
    fn fill_secure(
        &mut self,
        corpus: &Corpus,
    ) {
        for entry in corpus.entries() {
            let daemon: String = SECURE_DAEMON_TRIM
                .replace(&entry.daemon, "")
                .into_owned();
            let payload: String = normalize_secure_payload(&entry.payload);
            let key: String = self.filter.scrub(&format!("{} {}", daemon, payload));
            self.increment(&key, entry.clone());
        }
    }

    /// apache / intrusion-alert / raw family: key is the payload alone,
    /// scrubbed.
    fn fill_payload(
        &mut self,
        corpus: &Corpus,
    ) {
        for entry in corpus.entries() {
            let key: String = self.filter.scrub(&entry.payload);
            self.increment(&key, entry.clone());
        }
    }

    /// Add one occurrence of `key`, creating its record on first sight.
    pub fn increment(
        &mut self,
        key: &str,
        entry: Entry,
    ) {
        let record: &mut SigRecord = self
            .records
            .entry(key.to_string())
            .or_default();
        record.count += 1;
        record.samples.push(entry);
    }

    /// Remove meaningless signatures: those whose characters, once
    /// deduplicated, are all drawn from `{#, [, ], (, ), :}`.
    pub fn cleanup(&mut self) {
        self.records.retain(|key, _record| {
            !key.chars().all(|c| matches!(c, '#' | '[' | ']' | '(' | ')' | ':'))
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&SigRecord> {
        self.records.get(key)
    }

    pub fn remove(
        &mut self,
        key: &str,
    ) -> Option<SigRecord> {
        self.records.remove(key)
    }

    /// Signature keys in stored (lexicographic) order.
    pub fn keys(&self) -> btree_map::Keys<'_, String, SigRecord> {
        self.records.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, SigRecord> {
        self.records.iter()
    }

    /// Sum of every signature count; equals the number of corpus entries
    /// that survived cleanup.
    pub fn total_count(&self) -> Count {
        self.records.values().map(|record| record.count).sum()
    }

    /// All (signature, record) pairs sorted for display: count
    /// descending, alphabetical subsort.
    pub fn sorted(&self) -> Vec<(&String, &SigRecord)> {
        let mut pairs: Vec<(&String, &SigRecord)> = self.records.iter().collect();
        pairs.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));

        pairs
    }
}
