// src/bin/sift.rs

//! Driver program _sift_ drives the [_siftlib_].
//!
//! Processes user-passed command-line arguments, reads the corpus from
//! the passed path (or STDIN), lets the library classify and aggregate
//! it, optionally runs the fingerprint suppression pass, then prints the
//! report.
//!
//! Each library failure category maps to a distinct exit status; see the
//! `--help` output.
//!
//! [_siftlib_]: siftlib

use std::process::ExitCode;

use ::anyhow::Context;
use ::clap::{
    Parser,
    ValueEnum,
};
use ::const_format::concatcp;
use ::si_trace_print::stack::stack_offset_set;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
};

use ::siftlib::common::{
    FPath,
    ProcessingError,
};
use ::siftlib::debug::printers::e_err;
use ::siftlib::printer::printers::{
    print_sighash,
    ColorChoice,
    SampleMode,
};
use ::siftlib::readers::corpus::{
    read_lines,
    Corpus,
    CORPUS_ON_STDIN,
};
use ::siftlib::readers::filter::{
    Filter,
    FILTER_DIR_INSTALL,
    FILTER_DIR_PACKAGE,
    STOPWORDS_DAEMON,
    STOPWORDS_HASH,
    STOPWORDS_HOST,
    STOPWORDS_WORDS,
};
use ::siftlib::readers::fingerprint;
use ::siftlib::readers::fingerprint::{
    FINGERPRINT_DIR_INSTALL,
    FINGERPRINT_DIR_PACKAGE,
};
use ::siftlib::readers::sighash::SigHash;

// --------------------
// command-line parsing

/// general error exit value, for failures outside the library's
/// error taxonomy
const EXIT_ERR: u8 = 1;

const CLI_HELP_AFTER: &str = concatcp!(
    r#"Exit statuses:
  11  no input data
  13  cannot parse a line of the corpus
  14  no fingerprint resources found
  15  corpus type undeterminable
  16  filter or fingerprint resource unreadable

Filter resources are searched for under "#, FILTER_DIR_INSTALL, r#"
then "#, FILTER_DIR_PACKAGE, r#".
Fingerprint resources are searched for under "#, FINGERPRINT_DIR_INSTALL, r#"
then "#, FINGERPRINT_DIR_PACKAGE, r#".

---

Version: "#, env!("CARGO_PKG_VERSION"), r#"
License: "#, env!("CARGO_PKG_LICENSE"),
);

/// Which report to build from the corpus.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
#[allow(non_camel_case_types)]
enum CLI_Report {
    /// signatures of structurally-identical lines
    hash,
    /// entries per daemon
    daemon,
    /// entries per host
    host,
    /// word frequency of payloads
    words,
}

/// How signature records materialize to display strings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
#[allow(non_camel_case_types)]
enum CLI_Sample {
    /// show the signature
    none,
    /// show a random sample payload
    all,
    /// show a sample payload for low-count signatures
    threshold,
}

impl CLI_Sample {
    const fn to_sample_mode(self) -> SampleMode {
        match self {
            CLI_Sample::none => SampleMode::None,
            CLI_Sample::all => SampleMode::All,
            CLI_Sample::threshold => SampleMode::Threshold,
        }
    }
}

/// Values for command-line option `--color`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
#[allow(non_camel_case_types)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

impl CLI_Color_Choice {
    fn to_color_choice(self) -> ColorChoice {
        match self {
            CLI_Color_Choice::always => ColorChoice::Always,
            CLI_Color_Choice::auto => ColorChoice::Auto,
            CLI_Color_Choice::never => ColorChoice::Never,
        }
    }
}

/// clap command-line arguments build-time definitions.
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    name = "sift",
    version = concatcp!(
        "\nVersion: ",
        env!("CARGO_PKG_VERSION"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path of the log file to summarize. The corpus is read from STDIN
    /// when PATH is "-".
    #[clap(default_value = CORPUS_ON_STDIN)]
    path: String,

    /// Report to build from the corpus.
    #[clap(
        short = 'r',
        long,
        value_enum,
        default_value_t = CLI_Report::hash,
    )]
    report: CLI_Report,

    /// Sample display mode for signature records.
    #[clap(
        short = 's',
        long,
        value_enum,
        default_value_t = CLI_Sample::threshold,
    )]
    sample: CLI_Sample,

    /// Remove known event sequences, e.g. reboots, by fingerprint
    /// matching.
    #[clap(short = 'f', long)]
    fingerprint: bool,

    /// Do not load a stopwords filter; signature keys are not scrubbed.
    #[clap(long = "no-filter")]
    no_filter: bool,

    /// Extra directory searched first for filter resources.
    #[clap(long = "filters-dir", value_name = "DIR")]
    filters_dir: Option<String>,

    /// Extra directory searched first for fingerprint resources.
    #[clap(long = "fingerprints-dir", value_name = "DIR")]
    fingerprints_dir: Option<String>,

    /// Choose to print using colors.
    #[clap(
        short = 'c',
        long = "color",
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,
}

impl CLI_Args {
    /// The stopwords resource name for the chosen report.
    const fn stopwords_name(&self) -> &'static str {
        match self.report {
            CLI_Report::hash => STOPWORDS_HASH,
            CLI_Report::daemon => STOPWORDS_DAEMON,
            CLI_Report::host => STOPWORDS_HOST,
            CLI_Report::words => STOPWORDS_WORDS,
        }
    }
}

// --------------------
// processing

/// Load the requested stopwords filter, or the inert filter under
/// `--no-filter`.
fn load_filter(
    name: &str,
    no_filter: bool,
    extra_dirs: &[FPath],
) -> Result<Filter, ProcessingError> {
    match no_filter {
        true => Ok(Filter::new()),
        false => Filter::load(name, extra_dirs),
    }
}

fn run(args: CLI_Args) -> ::anyhow::Result<()> {
    defn!("({:?})", args);

    let lines: Vec<String> = read_lines(&args.path)
        .with_context(|| format!("failed to read {:?}", args.path))?;
    let corpus: Corpus = Corpus::from_lines(lines)?;
    defo!("corpus of {} entries, format {}", corpus.len(), corpus.format());

    let filter_dirs: Vec<FPath> = args.filters_dir.iter().cloned().collect();
    let filter: Filter = load_filter(args.stopwords_name(), args.no_filter, &filter_dirs)?;

    let mut sighash: SigHash = match args.report {
        CLI_Report::hash => SigHash::from_corpus(&corpus, filter),
        CLI_Report::daemon => SigHash::of_daemons(&corpus, filter),
        CLI_Report::host => SigHash::of_hosts(&corpus, filter),
        CLI_Report::words => SigHash::of_words(&corpus, filter),
    };

    if args.fingerprint {
        let fingerprint_dirs: Vec<FPath> = args.fingerprints_dir.iter().cloned().collect();
        // fingerprint reference corpora are keyed with the signature
        // stopwords, matching the target hash report
        let fingerprint_filter: Filter =
            load_filter(STOPWORDS_HASH, args.no_filter, &filter_dirs)?;
        let mut fingerprints = fingerprint::load(&fingerprint_dirs, &fingerprint_filter)?;
        defo!("loaded {} fingerprints", fingerprints.len());
        fingerprint::suppress(&mut sighash, &mut fingerprints);
    }

    print_sighash(&sighash, args.sample.to_sample_mode(), args.color_choice.to_color_choice())
        .context("failed to print the report")?;
    defx!();

    Ok(())
}

pub fn main() -> ExitCode {
    stack_offset_set(Some(0));
    let args = CLI_Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            e_err!("{:#}", err);
            match err.downcast_ref::<ProcessingError>() {
                Some(processing_err) => ExitCode::from(processing_err.exit_code()),
                None => ExitCode::from(EXIT_ERR),
            }
        }
    }
}
