//! Focused unit tests covering optimize configuration and request parsing.

use super::helpers::{THREE_PLACE_REQUEST, workspace, write_utf8};
use super::*;
use crate::optimize::{OptimizeConfig, config_from_layers_for_test, load_day_request};
use itinerary_core::{Algorithm, AnchorOffset};
use rstest::rstest;

fn args_with_request(path: &str) -> OptimizeArgs {
    OptimizeArgs {
        request_path: Some(path.into()),
        ..OptimizeArgs::default()
    }
}

fn invalid_field(err: CliError) -> &'static str {
    match err {
        CliError::InvalidArgument { field, .. } => field,
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_without_request_errors() {
    let err = OptimizeConfig::try_from(OptimizeArgs::default())
        .expect_err("missing request should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(env, ENV_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn defaults_fill_unset_options() {
    let config = OptimizeConfig::try_from(args_with_request("day.json")).expect("config");

    assert_eq!(config.algorithm, Algorithm::Annealing);
    assert_eq!(config.start_minutes, 480);
    assert_eq!(config.day_of_week, 1);
    assert_eq!(config.osrm_base_url, None);
    assert_eq!(config.osrm_profile, "driving");
    assert!(config.must_include.is_empty());
    assert!((config.must_include_bonus - 3000.0).abs() < f64::EPSILON);
    assert_eq!(config.max_concurrency, 4);
    assert_eq!(config.time_limit, None);
}

#[rstest]
fn explicit_options_are_resolved() {
    let args = OptimizeArgs {
        algorithm: Some("greedy".to_owned()),
        start_time: Some("09:30".to_owned()),
        day_of_week: Some(0),
        time_limit_ms: Some(1500),
        must_include: Some("pagoda, ,Museum".to_owned()),
        must_include_bonus: Some(500.0),
        ..args_with_request("day.json")
    };

    let config = OptimizeConfig::try_from(args).expect("config");

    assert_eq!(config.algorithm, Algorithm::Greedy);
    assert_eq!(config.start_minutes, 570);
    assert_eq!(config.day_of_week, 0);
    assert_eq!(config.time_limit, Some(std::time::Duration::from_millis(1500)));
    assert_eq!(config.must_include, ["pagoda", "Museum"]);
    assert!((config.must_include_bonus - 500.0).abs() < f64::EPSILON);
}

#[rstest]
#[case::unknown_algorithm(OptimizeArgs { algorithm: Some("tabu".to_owned()), ..OptimizeArgs::default() }, ARG_ALGORITHM)]
#[case::late_start(OptimizeArgs { start_time: Some("24:00".to_owned()), ..OptimizeArgs::default() }, ARG_START_TIME)]
#[case::garbled_start(OptimizeArgs { start_time: Some("noon".to_owned()), ..OptimizeArgs::default() }, ARG_START_TIME)]
#[case::day_out_of_range(OptimizeArgs { day_of_week: Some(7), ..OptimizeArgs::default() }, ARG_DAY_OF_WEEK)]
#[case::infinite_bonus(OptimizeArgs { must_include_bonus: Some(f64::INFINITY), ..OptimizeArgs::default() }, ARG_MUST_INCLUDE_BONUS)]
#[case::zero_concurrency(OptimizeArgs { max_concurrency: Some(0), ..OptimizeArgs::default() }, ARG_MAX_CONCURRENCY)]
#[case::blank_profile(OptimizeArgs { osrm_profile: Some(" ".to_owned()), ..OptimizeArgs::default() }, ARG_OSRM_PROFILE)]
fn invalid_options_are_rejected(#[case] overrides: OptimizeArgs, #[case] expected: &'static str) {
    let args = OptimizeArgs {
        request_path: Some("day.json".into()),
        ..overrides
    };

    let err = OptimizeConfig::try_from(args).expect_err("option should be rejected");

    assert_eq!(invalid_field(err), expected);
}

#[rstest]
fn validate_sources_reports_missing_request() {
    let (_tmp, root) = workspace();
    let config =
        OptimizeConfig::try_from(args_with_request(root.join("absent.json").as_str()))
            .expect("config");

    let err = config.validate_sources().expect_err("missing file");

    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_REQUEST),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    std::fs::create_dir(&request_path).expect("request directory");
    let config =
        OptimizeConfig::try_from(args_with_request(request_path.as_str())).expect("config");

    let err = config
        .validate_sources()
        .expect_err("expected directory path to fail validation");

    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(path, request_path);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_day_request_decodes_json() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_utf8(&request_path, THREE_PLACE_REQUEST.as_bytes());

    let request = load_day_request(&request_path).expect("request should decode");

    assert_eq!(request.places.len(), 3);
    let market = request.places.get(1).expect("market entry");
    assert_eq!(market.visit_duration, Some(45));
    let anchor = request.anchor.expect("anchor");
    assert_eq!(anchor.name.as_deref(), Some("Riverside Hotel"));
}

#[rstest]
fn load_day_request_rejects_invalid_json() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_utf8(&request_path, b"{ not valid json");

    let err = load_day_request(&request_path).expect_err("invalid json should error");

    match err {
        CliError::ParseRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_day_request_io_error_returns_open_error() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");

    let err = load_day_request(&request_path).expect_err("missing request should error");

    match err {
        CliError::OpenRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("expected OpenRequest, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "day_of_week": "monday" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "algorithm": "greedy",
            "start_time": "07:00",
            "osrm_base_url": "http://from-file:5000",
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": "from-env.json",
        "start_time": "07:30",
    }));
    composer.push_cli(json!({
        "start_time": "09:00",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path.as_str(), "from-env.json");
    assert_eq!(config.algorithm, Algorithm::Greedy);
    assert_eq!(config.start_minutes, 540);
    assert_eq!(config.osrm_base_url.as_deref(), Some("http://from-file:5000"));
}

#[rstest]
fn seed_pins_the_virtual_anchor_offset() {
    let args = OptimizeArgs {
        seed: Some(42),
        ..args_with_request("day.json")
    };
    let config = OptimizeConfig::try_from(args).expect("config");

    let planner = config.planner_config().expect("planner config");

    assert_eq!(planner.anchor_offset, AnchorOffset::Seeded(42));
    assert_eq!(planner.annealing.seed, Some(42));
}
