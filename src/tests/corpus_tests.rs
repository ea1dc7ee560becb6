// src/tests/corpus_tests.rs

//! tests for `corpus.rs`

use std::io::Write;

use ::regex::Regex;
use ::tempfile::NamedTempFile;

use crate::common::ProcessingError;
use crate::data::format::LogFormat;
use crate::readers::corpus::{
    read_lines,
    Corpus,
};

#[test]
fn test_read_lines_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "line one").unwrap();
    writeln!(file, "line two").unwrap();
    let path = (*(file.path().to_string_lossy())).to_string();

    let lines = read_lines(&path).unwrap();
    assert_eq!(lines, vec!["line one", "line two"]);
}

#[test]
fn test_read_lines_missing_file() {
    let path = String::from("/no/such/corpus.log");
    assert!(read_lines(&path).is_err());
}

#[test]
fn test_from_lines_empty_is_fatal() {
    let result = Corpus::from_lines(vec![]);
    match result {
        Err(err @ ProcessingError::NoInputData) => {
            assert_eq!(err.exit_code(), 11);
        }
        other => panic!("expected NoInputData, got {:?}", other),
    }
}

#[test]
fn test_from_lines_classifies_and_parses() {
    let lines: Vec<String> = (0..40)
        .map(|i| format!("Feb 10 11:53:{:02} host{} crond[{}]: batch job {}", i % 60, i, i, i))
        .collect();
    let corpus = Corpus::from_lines(lines).unwrap();
    assert_eq!(corpus.format(), LogFormat::Syslog);
    assert_eq!(corpus.len(), 40);
    assert_eq!(corpus.entries()[0].host, "host0");
}

#[test]
fn test_parse_with_reports_failing_line_number() {
    let lines: Vec<String> = vec![
        "Feb 10 11:53:08 host1 crond[1]: fine".to_string(),
        // six tokens, but the clock field will not convert
        "Feb 10 11:53 host1 crond[1]: broken".to_string(),
    ];
    let result = Corpus::parse_with(&lines, LogFormat::Syslog);
    match result {
        Err(err @ ProcessingError::CannotParseLine(2)) => {
            assert_eq!(err.exit_code(), 13);
        }
        other => panic!("expected CannotParseLine(2), got {:?}", other),
    }
}

#[test]
fn test_subset_filters_on_payload() {
    let lines: Vec<String> = vec![
        "kettle on".to_string(),
        "kettle off".to_string(),
        "toaster on".to_string(),
    ];
    let corpus = Corpus::parse_with(&lines, LogFormat::Raw).unwrap();
    let kettles = corpus.subset(&Regex::new("^kettle").unwrap());
    assert_eq!(kettles.len(), 2);
    assert_eq!(kettles.format(), LogFormat::Raw);
}
