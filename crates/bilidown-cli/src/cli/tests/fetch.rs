//! Tests for fetch and fetch-info subcommands.

use super::parse;
use crate::cli::commands::fetch::{engine_options, format_progress, fragment_size, Target};
use crate::cli::commands::fetch_info::parse_info;
use crate::cli::{Cli, CliCommand, EngineArgs};
use bilidown_core::config::BilidownConfig;
use bilidown_core::progress::ProgressStats;
use bilidown_core::DownloadInfo;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

fn info(format: Option<&str>) -> DownloadInfo {
    DownloadInfo {
        video_id: "BV1xx411c7mD".to_string(),
        size: 1000,
        url: "https://example.com/v.flv".to_string(),
        format: format.map(str::to_string),
    }
}

#[test]
fn cli_parse_fetch() {
    match parse(&[
        "bilidown",
        "fetch",
        "--url",
        "https://example.com/v.flv",
        "--size",
        "1000",
        "--id",
        "BV1xx411c7mD",
    ]) {
        CliCommand::Fetch {
            url,
            size,
            id,
            format,
            output,
            engine,
        } => {
            assert_eq!(url, "https://example.com/v.flv");
            assert_eq!(size, 1000);
            assert_eq!(id, "BV1xx411c7mD");
            assert!(format.is_none());
            assert!(output.is_none());
            assert!(engine.workers.is_none());
            assert!(!engine.sequential);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_engine_flags() {
    match parse(&[
        "bilidown",
        "fetch",
        "--url",
        "https://example.com/v.flv",
        "--size",
        "1000",
        "--id",
        "BV1",
        "--format",
        "flv720",
        "-o",
        "-",
        "--workers",
        "4",
        "--fragment-size",
        "400",
        "--timeout",
        "30",
        "--sequential",
    ]) {
        CliCommand::Fetch {
            format,
            output,
            engine,
            ..
        } => {
            assert_eq!(format.as_deref(), Some("flv720"));
            assert_eq!(output, Some(PathBuf::from("-")));
            assert_eq!(engine.workers, Some(4));
            assert_eq!(engine.fragment_size, Some(400));
            assert_eq!(engine.timeout, Some(30));
            assert!(engine.sequential);
        }
        _ => panic!("expected Fetch with engine flags"),
    }
}

#[test]
fn cli_parse_fetch_requires_size() {
    assert!(Cli::try_parse_from([
        "bilidown",
        "fetch",
        "--url",
        "https://example.com/v.flv",
        "--id",
        "BV1",
    ])
    .is_err());
}

#[test]
fn cli_parse_rejects_zero_timeout() {
    assert!(Cli::try_parse_from([
        "bilidown",
        "fetch",
        "--url",
        "https://example.com/v.flv",
        "--size",
        "1000",
        "--id",
        "BV1",
        "--timeout",
        "0",
    ])
    .is_err());
}

#[test]
fn cli_parse_fetch_info() {
    match parse(&["bilidown", "fetch-info", "info.json", "--workers", "2"]) {
        CliCommand::FetchInfo {
            path,
            output,
            engine,
        } => {
            assert_eq!(path, PathBuf::from("info.json"));
            assert!(output.is_none());
            assert_eq!(engine.workers, Some(2));
        }
        _ => panic!("expected FetchInfo"),
    }
}

#[test]
fn target_defaults_to_id_and_extension() {
    assert_eq!(
        Target::resolve(None, &info(Some("hdflv2"))),
        Target::File(PathBuf::from("BV1xx411c7mD.flv"))
    );
    assert_eq!(
        Target::resolve(None, &info(None)),
        Target::File(PathBuf::from("BV1xx411c7mD.bin"))
    );
    assert_eq!(
        Target::resolve(Some(PathBuf::from("-")), &info(None)),
        Target::Stdout
    );
    assert_eq!(
        Target::resolve(Some(PathBuf::from("out.mp4")), &info(None)),
        Target::File(PathBuf::from("out.mp4"))
    );
}

#[test]
fn flags_override_config() {
    let cfg = BilidownConfig {
        workers: Some(8),
        ..BilidownConfig::default()
    };
    let args = EngineArgs {
        workers: Some(2),
        timeout: Some(3),
        ..EngineArgs::default()
    };
    let opts = engine_options(&args, &cfg);
    assert_eq!(opts.workers, Some(2));
    assert_eq!(opts.fetch.request_timeout, Duration::from_secs(3));

    let opts = engine_options(&EngineArgs::default(), &cfg);
    assert_eq!(opts.workers, Some(8));
    assert_eq!(opts.fetch.request_timeout, Duration::from_secs(10));
}

#[test]
fn zero_fragment_size_flag_is_rejected() {
    let cfg = BilidownConfig::default();
    let args = EngineArgs {
        fragment_size: Some(0),
        ..EngineArgs::default()
    };
    assert!(fragment_size(&args, &cfg).is_err());
    assert_eq!(
        fragment_size(&EngineArgs::default(), &cfg).unwrap().get(),
        8 * 1024 * 1024
    );
}

#[test]
fn info_json_ignores_unknown_fields() {
    let json = r#"{
        "video_id": "BV1xx411c7mD",
        "avid": 170001,
        "cid": 279786,
        "qn": 80,
        "size": 1000,
        "length": 5000,
        "url": "https://example.com/v.flv",
        "format": "flv"
    }"#;
    let parsed = parse_info(json).unwrap();
    assert_eq!(parsed, info(Some("flv")));
    assert!(parse_info(r#"{"video_id": "x"}"#).is_err());
}

#[test]
fn progress_line_shows_counts() {
    let line = format_progress(&ProgressStats {
        bytes_done: 1_048_576,
        total_bytes: 2_097_152,
        elapsed_secs: 1.0,
        fragments_done: 1,
        fragment_count: 2,
    });
    assert!(line.contains("1.0 / 2.0 MiB"), "{line}");
    assert!(line.contains("(50.0%)"), "{line}");
    assert!(line.contains("1/2 fragments"), "{line}");
    assert!(line.contains("ETA 1s"), "{line}");
}
