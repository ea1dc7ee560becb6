// src/readers/fingerprint.rs

//! Fingerprint suppression: recognize and bulk-remove entire known event
//! sequences (e.g. reboot storms) from a target [`SigHash`].
//!
//! A [`Fingerprint`] is a named reference aggregator built from one `.fp`
//! file of log text, parsed and aggregated exactly like a normal corpus.
//! Applying it against a target counts how many of its signatures the
//! target contains; past a partial-match threshold the whole fingerprint
//! is deleted from the target and replaced by a single synthetic
//! signature carrying the fingerprint's name.
//!
//! Fingerprints are applied sequentially in ascending file-size order, so
//! smaller, more specific fingerprints are tried before larger ones.
//! Because each application can delete keys, later fingerprints see a
//! target already reduced by earlier ones — the ordering is part of the
//! observable contract.
//!
//! [`SigHash`]: crate::readers::sighash::SigHash

use crate::common::{
    Count,
    FPath,
    FPaths,
    FileSz,
    ProcessingError,
    ResultSift,
};
use crate::data::entry::Entry;
use crate::readers::corpus::Corpus;
use crate::readers::filter::{
    Filter,
    PRECEDING_DIR,
};
use crate::readers::helpers::{
    basename,
    path_filesz,
    fpath_join,
};
use crate::readers::sighash::SigHash;

use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// resource locations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// First directory searched for fingerprint resources.
pub const FINGERPRINT_DIR_INSTALL: &str = concatcp!(PRECEDING_DIR, "/fingerprints");

/// Second directory searched for fingerprint resources; the resources
/// shipped with this package.
pub const FINGERPRINT_DIR_PACKAGE: &str =
    concatcp!(env!("CARGO_MANIFEST_DIR"), "/resources/fingerprints");

/// File name marker of a fingerprint resource.
pub const FINGERPRINT_EXT: &str = ".fp";

/// Fraction of a fingerprint's signatures that must be present in the
/// target before the fingerprint is declared matched.
pub const THRESHOLD_COEFFICIENT: f64 = 0.31;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Fingerprint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Progress of one fingerprint's application against a target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FingerprintState {
    /// Not yet applied.
    NotEvaluated,
    /// Counting signature matches against the target.
    Scanning,
    /// Threshold crossed; the target was reduced.
    Matched,
    /// Signatures exhausted without crossing the threshold; the target
    /// was not modified.
    Rejected,
}

/// A named reference aggregator built from a static reference corpus.
///
/// Read-only relative to any target it is applied to: [`apply`] mutates
/// the target, never the fingerprint.
///
/// [`apply`]: Fingerprint::apply
#[derive(Debug)]
pub struct Fingerprint {
    /// Identifying name: the resource file's name, e.g.
    /// `"fedora11-reboot.fp"`.
    name: FPath,
    sighash: SigHash,
    state: FingerprintState,
}

impl Fingerprint {
    /// Build a fingerprint from one `.fp` resource file. The file is
    /// parsed and aggregated identically to a normal corpus, keyed
    /// through `filter`.
    pub fn from_file(
        path: &FPath,
        filter: &Filter,
    ) -> ResultSift<Fingerprint> {
        defn!("({:?})", path);
        let contents: String = std::fs::read_to_string(path)
            .map_err(|err| ProcessingError::ResourceUnreadable(path.clone(), err.to_string()))?;
        let lines: Vec<String> = contents.lines().map(String::from).collect();
        let corpus: Corpus = Corpus::from_lines(lines)?;
        let sighash: SigHash = SigHash::from_corpus(&corpus, filter.clone());
        defx!("{:?}: {} signatures", path, sighash.len());

        Ok(Fingerprint {
            name: basename(path),
            sighash,
            state: FingerprintState::NotEvaluated,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> FingerprintState {
        self.state
    }

    /// Number of signatures in this fingerprint.
    pub fn len(&self) -> usize {
        self.sighash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sighash.is_empty()
    }

    /// Apply this fingerprint against `target`.
    ///
    /// Scans the fingerprint's signatures in stored order, counting those
    /// present in the target. The moment the count exceeds
    /// `len() * `[`THRESHOLD_COEFFICIENT`], a second, independent full
    /// pass deletes *every* fingerprint signature present in the target,
    /// one synthetic signature keyed by the fingerprint's name is
    /// recorded in the target (its sample: the crossing signature's first
    /// sample entry, payload relabeled to the fingerprint name), and the
    /// scan stops. If the signatures are exhausted first, the target is
    /// left unmodified.
    pub fn apply(
        &mut self,
        target: &mut SigHash,
    ) -> FingerprintState {
        defn!("({:?}) against {} target signatures", self.name, target.len());
        self.state = FingerprintState::Scanning;
        let threshold: f64 = self.sighash.len() as f64 * THRESHOLD_COEFFICIENT;
        let mut matched: Count = 0;

        for key in self.sighash.keys() {
            if target.contains_key(key) {
                matched += 1;
            }
            if (matched as f64) > threshold {
                defo!("threshold {} crossed at {:?}", threshold, key);
                for key_ in self.sighash.keys() {
                    target.remove(key_);
                }
                // force the synthetic sample to carry the fingerprint
                // name as its payload
                let mut sample: Entry = self.sighash.get(key).unwrap().samples[0].clone();
                sample.payload = self.name.clone();
                target.increment(&self.name, sample);
                self.state = FingerprintState::Matched;
                break;
            }
        }
        if self.state == FingerprintState::Scanning {
            self.state = FingerprintState::Rejected;
        }
        defx!("{:?} matched {}, {:?}", self.name, matched, self.state);

        self.state
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// discovery, bulk application
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Locate fingerprint resource files.
///
/// Directories are searched in order — `extra_dirs`, then
/// [`FINGERPRINT_DIR_INSTALL`], then [`FINGERPRINT_DIR_PACKAGE`] — and
/// the first directory holding at least one `.fp` file wins. The found
/// files are sorted ascending by file size. Finding none is fatal.
pub fn discover(extra_dirs: &[FPath]) -> ResultSift<FPaths> {
    defn!("({:?})", extra_dirs);
    let dirs: FPaths = extra_dirs
        .iter()
        .map(|fpath| fpath.as_str())
        .chain([FINGERPRINT_DIR_INSTALL, FINGERPRINT_DIR_PACKAGE])
        .map(FPath::from)
        .collect();

    for dir in &dirs {
        let readdir = match std::fs::read_dir(dir) {
            Ok(val) => val,
            Err(_err) => continue,
        };
        let mut files: Vec<(FileSz, FPath)> = Vec::new();
        for dirent in readdir.flatten() {
            let name: String = dirent.file_name().to_string_lossy().to_string();
            if !name.contains(FINGERPRINT_EXT) {
                continue;
            }
            let path: FPath = fpath_join(dir, &name);
            let filesz: FileSz = path_filesz(&path).unwrap_or(0);
            files.push((filesz, path));
        }
        if files.is_empty() {
            continue;
        }
        // ascending size: smaller, more specific fingerprints apply first
        files.sort();
        let paths: FPaths = files.into_iter().map(|(_filesz, path)| path).collect();
        defx!("{} files under {:?}", paths.len(), dir);

        return Ok(paths);
    }
    defx!("return NoFingerprints");

    Err(ProcessingError::NoFingerprints(dirs))
}

/// Discover, build, and return every fingerprint, in application order.
pub fn load(
    extra_dirs: &[FPath],
    filter: &Filter,
) -> ResultSift<Vec<Fingerprint>> {
    let paths: FPaths = discover(extra_dirs)?;
    let mut fingerprints: Vec<Fingerprint> = Vec::with_capacity(paths.len());
    for path in &paths {
        fingerprints.push(Fingerprint::from_file(path, filter)?);
    }

    Ok(fingerprints)
}

/// Apply every fingerprint against `target`, sequentially, in the order
/// given (ascending reference-corpus size from [`load`]). Later
/// fingerprints see the target already reduced by earlier ones.
pub fn suppress(
    target: &mut SigHash,
    fingerprints: &mut [Fingerprint],
) {
    for fingerprint in fingerprints.iter_mut() {
        fingerprint.apply(target);
    }
}
