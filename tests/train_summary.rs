use clap::Parser;
use qmaze::cli::commands::train::{TrainArgs, execute};
use tempfile::tempdir;

fn parse_args<I, T>(args: I) -> TrainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TrainArgs::parse_from(args)
}

#[test]
fn summary_without_extension_appends_json() {
    let tmp = tempdir().unwrap();
    let summary_stem = tmp.path().join("run_overview");

    let args = parse_args([
        "qmaze-train",
        "--episodes",
        "5",
        "--maze-size",
        "5",
        "--seed",
        "42",
        "--quiet",
        "--summary",
        summary_stem.to_str().unwrap(),
    ]);

    execute(args).expect("training with summary should succeed");

    let expected_path = summary_stem.with_extension("json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );

    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["config"]["episodes"], 5);
    assert_eq!(parsed["config"]["maze_size"], 5);
    assert_eq!(parsed["statistics"]["episodes"], 5);
    assert!(parsed["elapsed_seconds"].as_f64().unwrap() >= 0.0);
}

#[test]
fn summary_directory_argument_creates_default_file() {
    let tmp = tempdir().unwrap();
    let summary_dir = tmp.path().join("summaries");
    let summary_arg = format!("{}/", summary_dir.display());

    let args = parse_args([
        "qmaze-train",
        "--episodes",
        "3",
        "--maze-size",
        "5",
        "--seed",
        "7",
        "--quiet",
        "--summary",
        &summary_arg,
    ]);

    execute(args).expect("training with summary directory should succeed");

    let expected_path = summary_dir.join("training_summary.json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );

    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["statistics"]["episodes"], 3);
}

#[test]
fn summary_with_wrong_extension_normalizes_to_json() {
    let tmp = tempdir().unwrap();
    let summary_path = tmp.path().join("overview.txt");

    let args = parse_args([
        "qmaze-train",
        "--episodes",
        "3",
        "--maze-size",
        "5",
        "--seed",
        "11",
        "--quiet",
        "--summary",
        summary_path.to_str().unwrap(),
    ]);

    execute(args).expect("training with summary should succeed");

    assert!(!summary_path.exists(), "unnormalized path should not exist");
    assert!(summary_path.with_extension("json").exists());
}

#[test]
fn zero_metrics_window_is_rejected() {
    let args = parse_args([
        "qmaze-train",
        "--episodes",
        "5",
        "--maze-size",
        "5",
        "--seed",
        "42",
        "--quiet",
        "--window",
        "0",
    ]);

    let error = execute(args).expect_err("a zero metrics window must not start training");
    assert!(error.to_string().contains("metrics window"));
}

#[test]
fn summary_statistics_are_internally_consistent() {
    let tmp = tempdir().unwrap();
    let summary_path = tmp.path().join("run.json");

    let args = parse_args([
        "qmaze-train",
        "--episodes",
        "50",
        "--maze-size",
        "5",
        "--wall-density",
        "0.2",
        "--seed",
        "42",
        "--quiet",
        "--summary",
        summary_path.to_str().unwrap(),
    ]);

    execute(args).expect("training with summary should succeed");

    let contents = std::fs::read_to_string(&summary_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();

    let episodes = parsed["statistics"]["episodes"].as_u64().unwrap();
    let successes = parsed["statistics"]["successes"].as_u64().unwrap();
    let success_rate = parsed["statistics"]["success_rate"].as_f64().unwrap();
    assert_eq!(episodes, 50);
    assert!(successes <= episodes);
    assert!((success_rate - successes as f64 / episodes as f64).abs() < 1e-9);

    let states = parsed["statistics"]["states_explored"].as_u64().unwrap();
    let values = parsed["statistics"]["total_values"].as_u64().unwrap();
    assert!(states > 0);
    assert_eq!(values, states * 4);
}

#[test]
fn episode_log_writes_one_record_per_episode() {
    let tmp = tempdir().unwrap();
    let log_path = tmp.path().join("episodes.jsonl");

    let args = parse_args([
        "qmaze-train",
        "--episodes",
        "8",
        "--maze-size",
        "5",
        "--seed",
        "3",
        "--quiet",
        "--episode-log",
        log_path.to_str().unwrap(),
    ]);

    execute(args).expect("training with episode log should succeed");

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let records: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(records.len(), 8);
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record["episode"], index);
        assert!(record["steps"].as_u64().unwrap() >= 1);
        assert!(record["success"].is_boolean());
    }
}

#[test]
fn export_table_writes_action_values_per_state() {
    let tmp = tempdir().unwrap();
    let table_path = tmp.path().join("q_table.json");

    let args = parse_args([
        "qmaze-train",
        "--episodes",
        "20",
        "--maze-size",
        "5",
        "--seed",
        "42",
        "--quiet",
        "--export-table",
        table_path.to_str().unwrap(),
    ]);

    execute(args).expect("training with table export should succeed");

    let contents = std::fs::read_to_string(&table_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let states = parsed.as_object().unwrap();

    assert!(!states.is_empty());
    // The start cell is touched on the first step of every episode.
    let start = states.get("0,0").expect("start state should be present");
    for direction in ["up", "right", "down", "left"] {
        assert!(start[direction].is_f64(), "missing value for {direction}");
    }
}

#[test]
fn history_csv_keeps_only_recent_episodes() {
    let tmp = tempdir().unwrap();
    let csv_path = tmp.path().join("history.csv");

    let args = parse_args([
        "qmaze-train",
        "--episodes",
        "30",
        "--maze-size",
        "5",
        "--seed",
        "42",
        "--quiet",
        "--history-limit",
        "10",
        "--history-csv",
        csv_path.to_str().unwrap(),
    ]);

    execute(args).expect("training with history export should succeed");

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    // Header plus the ten retained episodes.
    assert_eq!(lines.len(), 11);
    assert_eq!(
        lines[0],
        "episode,steps,total_reward,success,final_x,final_y"
    );
    // Retained rows carry their absolute episode numbers.
    assert!(lines[1].starts_with("20,"));
    assert!(lines[10].starts_with("29,"));
}
