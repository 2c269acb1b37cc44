use super::{
    apply_config, load_config_file, locate_config,
    types::{ConfigFile, DurationValue},
};
use std::ffi::OsString;
use std::path::PathBuf;
use clap::{CommandFactory, FromArgMatches};
use std::time::Duration;
use tempfile::tempdir;

use crate::args::{BenchArgs, Command, OutputFormat, ProbeKind, ShapeKind, StrategyKind};

fn parse_with_config(argv: &[&str], config: &ConfigFile) -> Result<BenchArgs, String> {
    let matches = BenchArgs::command()
        .try_get_matches_from(argv)
        .map_err(|err| format!("parse matches failed: {}", err))?;
    let mut args = BenchArgs::from_arg_matches(&matches)
        .map_err(|err| format!("parse args failed: {}", err))?;
    apply_config(&mut args, &matches, config).map_err(|err| err.to_string())?;
    Ok(args)
}

#[test]
fn parse_toml_config_with_aliases() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("stratbench.toml");
    let content = r#"
tasks = 40
shape = "cpu"
worker_counts = [1, 2, 4]
timeout = "250ms"
baseline = "sync"
candidate = "processes"
probe = "rss"
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.task_count != Some(40) {
        return Err("Unexpected task_count".to_owned());
    }
    if config.workload_shape != Some(ShapeKind::Cpu) {
        return Err("Unexpected shape".to_owned());
    }
    if config.worker_counts.as_deref() != Some(&[1, 2, 4][..]) {
        return Err("Unexpected worker_counts".to_owned());
    }
    if config.baseline != Some(StrategyKind::Sequential) {
        return Err("Unexpected baseline".to_owned());
    }
    if config.candidate != Some(StrategyKind::ProcessPool) {
        return Err("Unexpected candidate".to_owned());
    }
    if config.memory_probe != Some(ProbeKind::Rss) {
        return Err("Unexpected probe".to_owned());
    }
    let timeout = match config.task_timeout {
        Some(timeout) => timeout.to_duration().map_err(|err| err.to_string())?,
        None => return Err("Expected timeout".to_owned()),
    };
    if timeout != Duration::from_millis(250) {
        return Err(format!("Unexpected timeout: {:?}", timeout));
    }

    Ok(())
}

#[test]
fn parse_json_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("stratbench.json");
    let content = r#"{
  "task_count": 12,
  "base_url": "http://127.0.0.1:8080/",
  "strategies": ["event-loop", "thread-pool"],
  "workers": 16,
  "task_timeout": 3,
  "output_format": "json"
}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.base_url.as_deref() != Some("http://127.0.0.1:8080/") {
        return Err("Unexpected base_url".to_owned());
    }
    if config.strategies
        != Some(vec![StrategyKind::EventLoop, StrategyKind::ThreadPool])
    {
        return Err("Unexpected strategies".to_owned());
    }
    if config.output_format != Some(OutputFormat::Json) {
        return Err("Unexpected output_format".to_owned());
    }
    match config.task_timeout {
        Some(DurationValue::Seconds(3)) => Ok(()),
        Some(DurationValue::Seconds(_) | DurationValue::Text(_)) | None => {
            Err("Expected numeric timeout".to_owned())
        }
    }
}

#[test]
fn load_config_rejects_unknown_extension() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("stratbench.yaml");
    std::fs::write(&path, "tasks: 1").map_err(|err| format!("write failed: {}", err))?;

    if load_config_file(&path).is_ok() {
        return Err("Expected unsupported extension error".to_owned());
    }
    Ok(())
}

#[test]
fn apply_config_fills_unset_compare_values() -> Result<(), String> {
    let config = ConfigFile {
        task_count: Some(30),
        base_url: Some("http://localhost:9000/".to_owned()),
        task_timeout: Some(DurationValue::Text("2s".to_owned())),
        strategies: Some(vec![StrategyKind::ThreadPool]),
        workers: Some(6),
        no_color: Some(true),
        ..ConfigFile::default()
    };

    let args = parse_with_config(&["stratbench", "compare"], &config)?;
    if !args.no_color {
        return Err("Expected no_color from config".to_owned());
    }
    let compare = match args.command {
        Command::Compare(compare) => compare,
        Command::Sweep(_) | Command::Worker => return Err("Expected compare".to_owned()),
    };
    if compare.workload.task_count.get() != 30 {
        return Err("Unexpected task_count".to_owned());
    }
    if compare.workload.base_url != "http://localhost:9000" {
        return Err(format!("Unexpected base_url: {}", compare.workload.base_url));
    }
    if compare.workload.task_timeout != Some(Duration::from_secs(2)) {
        return Err("Unexpected timeout".to_owned());
    }
    if compare.resolved_strategies() != vec![StrategyKind::ThreadPool] {
        return Err("Unexpected strategies".to_owned());
    }
    if compare.resolved_workers().get() != 6 {
        return Err("Unexpected workers".to_owned());
    }
    Ok(())
}

#[test]
fn apply_config_keeps_cli_values() -> Result<(), String> {
    let config = ConfigFile {
        task_count: Some(30),
        worker_counts: Some(vec![3, 5]),
        candidate: Some(StrategyKind::ThreadPool),
        ..ConfigFile::default()
    };

    let args = parse_with_config(
        &[
            "stratbench",
            "sweep",
            "--tasks",
            "8",
            "--candidate",
            "process-pool",
        ],
        &config,
    )?;
    let sweep = match args.command {
        Command::Sweep(sweep) => sweep,
        Command::Compare(_) | Command::Worker => return Err("Expected sweep".to_owned()),
    };
    if sweep.workload.task_count.get() != 8 {
        return Err("CLI task count should win".to_owned());
    }
    if sweep.resolved_candidate() != StrategyKind::ProcessPool {
        return Err("CLI candidate should win".to_owned());
    }
    let counts: Vec<usize> = sweep
        .resolved_worker_counts()
        .iter()
        .map(|count| count.get())
        .collect();
    if counts != vec![3, 5] {
        return Err(format!("Unexpected worker counts: {:?}", counts));
    }
    Ok(())
}

#[test]
fn apply_config_rejects_zero_values() -> Result<(), String> {
    let zero_tasks = ConfigFile {
        task_count: Some(0),
        ..ConfigFile::default()
    };
    if parse_with_config(&["stratbench", "compare"], &zero_tasks).is_ok() {
        return Err("Expected zero task_count error".to_owned());
    }

    let zero_worker = ConfigFile {
        worker_counts: Some(vec![2, 0]),
        ..ConfigFile::default()
    };
    if parse_with_config(&["stratbench", "sweep"], &zero_worker).is_ok() {
        return Err("Expected zero worker count error".to_owned());
    }
    Ok(())
}

#[test]
fn locate_config_prefers_explicit_then_env() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    std::fs::write(dir.path().join("stratbench.toml"), "tasks = 1\n")
        .map_err(|err| format!("write failed: {}", err))?;

    let explicit = locate_config(
        Some(PathBuf::from("bench.json")),
        Some(OsString::from("env.toml")),
        dir.path(),
    );
    if explicit != Some(PathBuf::from("bench.json")) {
        return Err(format!("Explicit path should win: {:?}", explicit));
    }

    let from_env = locate_config(None, Some(OsString::from("env.toml")), dir.path());
    if from_env != Some(PathBuf::from("env.toml")) {
        return Err(format!("Environment path should win: {:?}", from_env));
    }

    let discovered = locate_config(None, Some(OsString::new()), dir.path());
    if discovered != Some(dir.path().join("stratbench.toml")) {
        return Err(format!("Empty env value should fall through: {:?}", discovered));
    }
    Ok(())
}

#[test]
fn locate_config_prefers_toml_over_json() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    if locate_config(None, None, dir.path()).is_some() {
        return Err("Empty directory should yield no config".to_owned());
    }

    std::fs::write(dir.path().join("stratbench.json"), "{}")
        .map_err(|err| format!("write failed: {}", err))?;
    if locate_config(None, None, dir.path()) != Some(dir.path().join("stratbench.json")) {
        return Err("Expected the json file when it is alone".to_owned());
    }

    std::fs::write(dir.path().join("stratbench.toml"), "")
        .map_err(|err| format!("write failed: {}", err))?;
    match locate_config(None, None, dir.path()) {
        Some(path) if path == dir.path().join("stratbench.toml") => Ok(()),
        other => Err(format!("Expected the toml file to win: {:?}", other)),
    }
}

#[test]
fn locate_config_skips_directories_named_like_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    std::fs::create_dir(dir.path().join("stratbench.toml"))
        .map_err(|err| format!("mkdir failed: {}", err))?;
    match locate_config(None, None, dir.path()) {
        None => Ok(()),
        Some(path) => Err(format!("Directory picked as config: {}", path.display())),
    }
}
