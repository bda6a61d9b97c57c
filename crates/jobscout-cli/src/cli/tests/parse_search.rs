//! Tests for the search subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_search_defaults() {
    match parse(&["jobscout", "search", "rust engineer"]) {
        CliCommand::Search {
            query,
            days,
            min_score,
            limit,
            resume,
            remote_only,
            location,
            save,
            json,
        } => {
            assert_eq!(query, "rust engineer");
            assert!(days.is_none());
            assert!(min_score.is_none());
            assert!(limit.is_none());
            assert!(resume.is_none());
            assert!(!remote_only);
            assert!(location.is_none());
            assert!(!save);
            assert!(!json);
        }
        _ => panic!("expected Search"),
    }
}

#[test]
fn cli_parse_search_all_flags() {
    match parse(&[
        "jobscout",
        "search",
        "security analyst",
        "--days",
        "7",
        "--min-score",
        "60",
        "--limit",
        "25",
        "--resume",
        "/tmp/resume.txt",
        "--remote-only",
        "--location",
        "Denver, CO",
        "--save",
        "--json",
    ]) {
        CliCommand::Search {
            query,
            days,
            min_score,
            limit,
            resume,
            remote_only,
            location,
            save,
            json,
        } => {
            assert_eq!(query, "security analyst");
            assert_eq!(days, Some(7));
            assert_eq!(min_score, Some(60));
            assert_eq!(limit, Some(25));
            assert_eq!(resume.as_deref(), Some(std::path::Path::new("/tmp/resume.txt")));
            assert!(remote_only);
            assert_eq!(location.as_deref(), Some("Denver, CO"));
            assert!(save);
            assert!(json);
        }
        _ => panic!("expected Search with flags"),
    }
}

#[test]
fn cli_parse_search_negative_days_reaches_validation() {
    match parse(&["jobscout", "search", "x", "--days", "-3"]) {
        CliCommand::Search { days, .. } => assert_eq!(days, Some(-3)),
        _ => panic!("expected Search"),
    }
}

#[test]
fn cli_parse_search_rejects_out_of_range_min_score() {
    assert!(Cli::try_parse_from(["jobscout", "search", "x", "--min-score", "101"]).is_err());
    assert!(Cli::try_parse_from(["jobscout", "search", "x", "--min-score", "-1"]).is_err());
}

#[test]
fn cli_parse_search_requires_query() {
    assert!(Cli::try_parse_from(["jobscout", "search"]).is_err());
}

#[test]
fn cli_parse_search_rejects_zero_limit() {
    assert!(Cli::try_parse_from(["jobscout", "search", "x", "--limit", "0"]).is_err());
    assert!(Cli::try_parse_from(["jobscout", "search", "x", "--limit", "1"]).is_ok());
}
