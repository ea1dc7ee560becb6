// src/tests/sighash_tests.rs

//! tests for `sighash.rs`: key extraction per family, the cleanup rule,
//! aggregation conservation, word-frequency merging, and secure-auth
//! phrase normalization

use ::test_case::test_case;

use crate::data::entry::Entry;
use crate::data::format::LogFormat;
use crate::readers::corpus::Corpus;
use crate::readers::filter::Filter;
use crate::readers::sighash::SigHash;

fn corpus_of(
    lines: &[&str],
    format: LogFormat,
) -> Corpus {
    let lines: Vec<String> = lines.iter().map(|line| line.to_string()).collect();

    Corpus::parse_with(&lines, format).unwrap()
}

/// a filter scrubbing digit runs and IPv4 addresses
fn digits_and_ips() -> Filter {
    Filter::from_patterns(&[r"([0-9]{1,3}\.){3}[0-9]{1,3}", r"[0-9]+"]).unwrap()
}

#[test]
fn test_increment_creates_then_counts() {
    let mut sighash = SigHash::new(Filter::new());
    assert!(!sighash.contains_key("crond ran"));
    sighash.increment("crond ran", Entry::blank());
    sighash.increment("crond ran", Entry::blank());
    let record = sighash.get("crond ran").unwrap();
    assert_eq!(record.count, 2);
    assert_eq!(record.samples.len(), 2);
}

#[test]
fn test_syslog_family_keys_on_daemon_and_payload() {
    let corpus = corpus_of(
        &[
            "Feb 29 11:53:08 host1 crond[2932]: starting batch job 7",
            "Feb 29 11:54:08 host2 crond[411]: starting batch job 9",
        ],
        LogFormat::Syslog,
    );
    let sighash = SigHash::from_corpus(&corpus, digits_and_ips());
    // pids and job numbers scrub away, both lines collapse to one key
    assert_eq!(sighash.len(), 1);
    let record = sighash.get("crond[#]: starting batch job #").unwrap();
    assert_eq!(record.count, 2);
}

#[test]
fn test_payload_family_ignores_daemon() {
    let corpus = corpus_of(
        &["connection refused", "connection refused", "disk full"],
        LogFormat::Raw,
    );
    let sighash = SigHash::from_corpus(&corpus, Filter::new());
    assert_eq!(sighash.len(), 2);
    assert_eq!(sighash.get("connection refused").unwrap().count, 2);
    assert_eq!(sighash.get("disk full").unwrap().count, 1);
}

#[test]
fn test_aggregation_conservation() {
    let corpus = corpus_of(
        &[
            "Feb 29 11:53:08 host1 crond[2932]: starting batch job 7",
            "Feb 29 11:54:08 host2 crond[411]: starting batch job 9",
            "Feb 29 11:55:08 host1 ntpd[101]: time reset",
            "Feb 29 11:56:08 host1 ntpd[101]: time reset",
            "Feb 29 11:57:08 host3 kernel: out of memory",
        ],
        LogFormat::Syslog,
    );
    let sighash = SigHash::from_corpus(&corpus, digits_and_ips());
    // no signature was cleaned up, so counts must sum to the entry count
    assert_eq!(sighash.total_count(), corpus.len() as u64);
}

// the cleanup rule: a signature whose deduplicated character set is
// within {#,[,],(,),:} carries no information
#[test_case("#", false; "hash only")]
#[test_case("#:#", false; "hash colon hash")]
#[test_case("()", false; "parens only")]
#[test_case("[#]:", false; "brackets hash colon")]
#[test_case("# #", true; "space survives")]
#[test_case("a#", true; "letter survives")]
#[test_case("sshd #", true)]
fn test_cleanup_rule(
    key: &str,
    survives: bool,
) {
    let mut sighash = SigHash::new(Filter::new());
    sighash.increment(key, Entry::blank());
    sighash.cleanup();
    assert_eq!(sighash.contains_key(key), survives);
}

#[test]
fn test_secure_phrase_normalization_end_to_end() {
    // five accepted-password lines differing in user and address
    // collapse to one signature
    let lines: Vec<String> = (0..5)
        .map(|i| {
            format!(
                "Jan 1 00:00:0{} host{} sshd[{}]: Accepted password for user{} from 10.0.0.{}",
                i,
                i,
                100 + i,
                i,
                i + 1
            )
        })
        .collect();
    let corpus = Corpus::parse_with(&lines, LogFormat::SecureAuth).unwrap();
    let sighash = SigHash::from_corpus(&corpus, digits_and_ips());

    assert_eq!(sighash.len(), 1);
    let record = sighash.get("sshd Accepted password for # from #").unwrap();
    assert_eq!(record.count, 5);
    // samples keep the unscrubbed payloads
    assert_eq!(record.samples.len(), 5);
    assert!(record.samples[0].payload.contains("user0"));
}

#[test]
fn test_secure_failed_password_invalid_user() {
    let lines: Vec<String> = vec![
        "Jan 1 00:00:01 host1 sshd[100]: Failed password for invalid user eve from 10.0.0.9 port 4242 ssh2"
            .to_string(),
        "Jan 1 00:00:02 host1 sshd[101]: Failed password for root from 10.0.0.9 port 4243 ssh2"
            .to_string(),
    ];
    let corpus = Corpus::parse_with(&lines, LogFormat::SecureAuth).unwrap();
    let sighash = SigHash::from_corpus(&corpus, digits_and_ips());

    // the invalid-user form normalizes before the from-preserving form
    // can see it, so the two lines stay distinct
    assert!(sighash.contains_key("sshd Failed password for invalid user #"));
    assert!(sighash.contains_key("sshd Failed password for # from #"));
}

#[test]
fn test_daemon_report() {
    let corpus = corpus_of(
        &[
            "Feb 29 11:53:08 host1 crond[2932]: starting batch job 7",
            "Feb 29 11:54:08 host2 crond[411]: starting batch job 9",
            "Feb 29 11:55:08 host1 ntpd[101]: time reset",
        ],
        LogFormat::Syslog,
    );
    let filter = Filter::from_patterns(&[r"\[[0-9]+\]:?"]).unwrap();
    let sighash = SigHash::of_daemons(&corpus, filter);
    assert_eq!(sighash.get("crond#").unwrap().count, 2);
    assert_eq!(sighash.get("ntpd#").unwrap().count, 1);
}

#[test]
fn test_host_report() {
    let corpus = corpus_of(
        &[
            "Feb 29 11:53:08 host1 crond[2932]: starting batch job 7",
            "Feb 29 11:54:08 host2 crond[411]: starting batch job 9",
            "Feb 29 11:55:08 host1 ntpd[101]: time reset",
        ],
        LogFormat::Syslog,
    );
    let sighash = SigHash::of_hosts(&corpus, Filter::new());
    assert_eq!(sighash.get("host1").unwrap().count, 2);
    assert_eq!(sighash.get("host2").unwrap().count, 1);
}

#[test]
fn test_word_report_merges_after_scrub() {
    // "error17" and "error42" scrub to the identical "error#";
    // their counts merge
    let corpus = corpus_of(&["error17 error42 disk", "error17 disk"], LogFormat::Raw);
    let sighash = SigHash::of_words(&corpus, digits_and_ips());

    assert_eq!(sighash.get("error#").unwrap().count, 3);
    assert_eq!(sighash.get("disk").unwrap().count, 2);
    assert_eq!(sighash.len(), 2);
}

#[test]
fn test_word_report_conservation() {
    let corpus = corpus_of(&["alpha beta gamma", "alpha beta"], LogFormat::Raw);
    let sighash = SigHash::of_words(&corpus, Filter::new());
    // one signature per distinct word, counts sum to total words
    assert_eq!(sighash.len(), 3);
    assert_eq!(sighash.total_count(), 5);
}

#[test]
fn test_sorted_by_count_then_alphabetical() {
    let mut sighash = SigHash::new(Filter::new());
    for _ in 0..3 {
        sighash.increment("zebra", Entry::blank());
    }
    for _ in 0..3 {
        sighash.increment("aardvark", Entry::blank());
    }
    for _ in 0..7 {
        sighash.increment("middling", Entry::blank());
    }
    let keys: Vec<&str> = sighash
        .sorted()
        .into_iter()
        .map(|(key, _record)| key.as_str())
        .collect();
    assert_eq!(keys, vec!["middling", "aardvark", "zebra"]);
}
