// src/tests/format_tests.rs

//! tests for `format.rs`: acceptance predicates, parsers, priorities,
//! quorum rules

use ::test_case::test_case;

use crate::common::SCRUB_CHAR;
use crate::data::entry::{
    year_now,
    Entry,
};
use crate::data::format::{
    LogFormat,
    FORMATS,
};

const LINE_SYSLOG: &str = "Feb 29 11:53:08 host1 crond[2932]: starting batch job";
const LINE_SECURE_SSHD: &str =
    "Jan 1 00:00:01 host1 sshd[2817]: Accepted password for bob from 10.0.0.1";
const LINE_SECURE_PAM: &str =
    "Oct 10 06:47:01 host1 su: pam_unix(su:session): session opened for user root";
const LINE_RSYSLOG: &str =
    "2010-06-24T17:56:32.197716-04:00 host1 ntpd[2241]: time reset +0.213577 s";
const LINE_RSYSLOG_NO_FRACTION: &str =
    "2010-06-24T17:56:32-04:00 host1 ntpd[2241]: time reset +0.213577 s";
const LINE_APACHE_ACCESS: &str = r#"127.0.0.1 - - [03/Aug/2009:11:53:08 -0400] "GET /index.html HTTP/1.1" 200 2326 "-" "Mozilla/5.0""#;
const LINE_APACHE_ERROR: &str =
    "[Sat Feb 27 12:16:10 2010] [error] [client 127.0.0.1] File does not exist: /var/www/html/favicon.ico";
const LINE_SNORT: &str =
    "09/29-10:18:46.026172 [**] [1:2925:3] INFO web bug 1x1 gif attempt [**]";
const LINE_RAW: &str = "four score and seven years ago";

fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// which single format wins a first-match-wins scan of `FORMATS`
fn first_match(line: &str) -> Option<LogFormat> {
    let tokens = tokenize(line);

    FORMATS.iter().find(|format| format.accepts(&tokens)).copied()
}

#[test_case(LINE_SYSLOG, LogFormat::Syslog)]
#[test_case(LINE_SECURE_SSHD, LogFormat::SecureAuth)]
#[test_case(LINE_SECURE_PAM, LogFormat::SecureAuth)]
#[test_case(LINE_RSYSLOG, LogFormat::Rsyslog)]
#[test_case(LINE_RSYSLOG_NO_FRACTION, LogFormat::Rsyslog)]
#[test_case(LINE_APACHE_ACCESS, LogFormat::ApacheAccess)]
#[test_case(LINE_APACHE_ERROR, LogFormat::ApacheError)]
#[test_case(LINE_SNORT, LogFormat::IntrusionAlert)]
#[test_case(LINE_RAW, LogFormat::Raw)]
fn test_first_match(
    line: &str,
    expected: LogFormat,
) {
    assert_eq!(first_match(line), Some(expected));
}

#[test]
fn test_accepts_nothing_for_blank() {
    let tokens: Vec<&str> = vec![];
    for format in FORMATS.iter() {
        assert!(!format.accepts(&tokens), "{} accepted a blank line", format);
    }
}

#[test]
fn test_syslog_rejects_sshd() {
    // overlap guard: the sshd token belongs to the secure-auth grammar
    let tokens = tokenize(LINE_SECURE_SSHD);
    assert!(!LogFormat::Syslog.accepts(&tokens));
    assert!(LogFormat::SecureAuth.accepts(&tokens));
}

#[test]
fn test_rsyslog_never_apache_access() {
    let tokens = tokenize(LINE_RSYSLOG);
    assert!(!LogFormat::ApacheAccess.accepts(&tokens));
}

#[test]
fn test_priorities_strictly_descending() {
    for pair in FORMATS.windows(2) {
        assert!(
            pair[0].priority() > pair[1].priority(),
            "{} !> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_quorum_default_rule() {
    // default rule: tally strictly above threshold
    assert!(!LogFormat::Syslog.quorum(2, 2.5, 10));
    assert!(LogFormat::Syslog.quorum(3, 2.5, 10));
}

#[test]
fn test_quorum_secure_unanimous() {
    // secure-auth requires a match for every sample drawn
    assert!(!LogFormat::SecureAuth.quorum(9, 2.5, 10));
    assert!(LogFormat::SecureAuth.quorum(10, 2.5, 10));
    assert!(!LogFormat::SecureAuth.quorum(10, 2.5, 20));
}

// ----------------
// parsers

#[test]
fn test_parse_syslog() {
    let entry: Entry = LogFormat::Syslog.parse(LINE_SYSLOG).unwrap();
    assert_eq!(entry.year, year_now());
    assert_eq!(entry.month, 2);
    assert_eq!(entry.day, 29);
    assert_eq!(entry.hour, 11);
    assert_eq!(entry.minute, 53);
    assert_eq!(entry.second, 8);
    assert_eq!(entry.host, "host1");
    assert_eq!(entry.daemon, "crond[2932]:");
    assert_eq!(entry.payload, "starting batch job");
}

#[test]
fn test_parse_syslog_short_line_is_abnormal() {
    let entry: Entry = LogFormat::Syslog.parse("lost message").unwrap();
    assert_eq!(entry.year, 1900);
    assert_eq!(entry.host, SCRUB_CHAR);
    assert_eq!(entry.payload, "lost message");
}

#[test]
fn test_parse_syslog_blank_line() {
    let entry: Entry = LogFormat::Syslog.parse("").unwrap();
    assert_eq!(entry.payload, SCRUB_CHAR);
}

#[test]
fn test_parse_syslog_bad_clock_is_error() {
    // structurally long enough, but the clock token will not convert
    assert!(LogFormat::Syslog.parse("Feb 29 11:53 host1 crond: x").is_none());
}

#[test]
fn test_parse_syslog_bad_month_is_error() {
    assert!(LogFormat::Syslog.parse("Zzz 29 11:53:08 host1 crond: x").is_none());
}

#[test_case(LINE_RSYSLOG; "with fractional seconds")]
#[test_case(LINE_RSYSLOG_NO_FRACTION; "without fractional seconds")]
fn test_parse_rsyslog(line: &str) {
    let entry: Entry = LogFormat::Rsyslog.parse(line).unwrap();
    assert_eq!(entry.year, 2010);
    assert_eq!(entry.month, 6);
    assert_eq!(entry.day, 24);
    assert_eq!(entry.hour, 17);
    assert_eq!(entry.minute, 56);
    assert_eq!(entry.second, 32);
    assert_eq!(entry.host, "host1");
    assert_eq!(entry.daemon, "ntpd[2241]:");
    assert_eq!(entry.payload, "time reset +0.213577 s");
}

#[test]
fn test_parse_apache_access() {
    let entry: Entry = LogFormat::ApacheAccess.parse(LINE_APACHE_ACCESS).unwrap();
    assert_eq!(entry.year, 2009);
    assert_eq!(entry.month, 8);
    assert_eq!(entry.day, 3);
    assert_eq!(entry.hour, 11);
    assert_eq!(entry.minute, 53);
    assert_eq!(entry.second, 8);
    // the request URI doubles as host and payload
    assert_eq!(entry.host, "/index.html");
    assert_eq!(entry.payload, "/index.html");
    assert_eq!(entry.daemon, SCRUB_CHAR);
}

#[test]
fn test_parse_apache_error() {
    let entry: Entry = LogFormat::ApacheError.parse(LINE_APACHE_ERROR).unwrap();
    assert_eq!(entry.year, 2010);
    assert_eq!(entry.month, 2);
    assert_eq!(entry.day, 27);
    assert_eq!(entry.hour, 12);
    assert_eq!(entry.minute, 16);
    assert_eq!(entry.second, 10);
    assert_eq!(entry.host, SCRUB_CHAR);
    assert_eq!(
        entry.payload,
        "[error] [client 127.0.0.1] File does not exist: /var/www/html/favicon.ico"
    );
}

#[test]
fn test_parse_snort() {
    let entry: Entry = LogFormat::IntrusionAlert.parse(LINE_SNORT).unwrap();
    assert_eq!(entry.year, year_now());
    assert_eq!(entry.month, 9);
    assert_eq!(entry.day, 29);
    assert_eq!(entry.hour, 10);
    assert_eq!(entry.minute, 18);
    assert_eq!(entry.second, 46);
    assert_eq!(entry.payload, "[**] [1:2925:3] INFO web bug 1x1 gif attempt [**]");
}

#[test]
fn test_parse_raw_keeps_whole_line() {
    let entry: Entry = LogFormat::Raw.parse(LINE_RAW).unwrap();
    assert_eq!(entry.year, 1900);
    assert_eq!(entry.host, SCRUB_CHAR);
    assert_eq!(entry.daemon, SCRUB_CHAR);
    assert_eq!(entry.payload, LINE_RAW);
}
