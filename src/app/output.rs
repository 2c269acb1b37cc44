use std::time::Duration;

use serde_json::{Value, json};

use crate::args::{OutputFormat, ShapeKind};
use crate::error::AppResult;
use crate::metrics::{LatencySummary, RunMetrics};
use crate::report::{CandidateComparison, ComparisonReport, ParityPoint};

pub(super) struct ReportContext {
    pub(super) command: &'static str,
    pub(super) shape: ShapeKind,
    pub(super) task_count: usize,
    pub(super) probe: &'static str,
}

pub(super) fn print_report(
    report: &ComparisonReport,
    context: &ReportContext,
    format: OutputFormat,
) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in report_lines(report, context) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&report_json(report, context))?;
            println!("{}", rendered);
        }
    }
    Ok(())
}

fn report_lines(report: &ComparisonReport, context: &ReportContext) -> Vec<String> {
    let mut lines = vec![format!(
        "stratbench {}: {} workload, {} tasks, probe {}, {} CPUs available",
        context.command,
        context.shape.as_str(),
        context.task_count,
        context.probe,
        report.available_parallelism
    )];

    lines.push(format!("Baseline {}", metrics_line(&report.baseline)));
    for candidate in &report.candidates {
        lines.push(format!("  {}", candidate_line(candidate)));
    }

    match report.diminishing_returns_point {
        Some(workers) => lines.push(format!("Diminishing returns from {} workers", workers)),
        None => lines.push("No diminishing returns detected".to_owned()),
    }
    match &report.parity_point {
        Some(parity) => lines.push(format!(
            "Parity with baseline: {} at {} workers (memory {})",
            parity.strategy,
            parity.worker_count,
            format_ratio(parity.memory_ratio)
        )),
        None => lines.push("No candidate reached parity with the baseline".to_owned()),
    }
    lines
}

fn metrics_line(metrics: &RunMetrics) -> String {
    let head = format!("{} ({} workers)", metrics.strategy, metrics.worker_count);
    let Some(wall_time) = metrics.wall_time else {
        return format!(
            "{}: FAILED: {}",
            head,
            metrics.error.as_deref().unwrap_or("unknown error")
        );
    };

    let mut wall = format!("wall {}", format_duration(wall_time));
    if let Some(sample) = metrics.sample
        && let Some(projected) = metrics.projected_wall_time()
    {
        wall = format!(
            "{} (projected {} from {}/{} tasks)",
            wall,
            format_duration(projected),
            sample.measured_tasks,
            sample.total_tasks
        );
    }
    let mut parts = vec![
        wall,
        format!(
            "peak memory {}",
            metrics
                .peak_memory_bytes
                .map_or_else(|| "n/a".to_owned(), format_bytes)
        ),
        format!(
            "failures {}/{}",
            metrics.failure_count, metrics.result_count
        ),
        format!("timeouts {}", metrics.timeout_count),
    ];
    if let Some(latency) = metrics.latency {
        parts.push(format!(
            "latency p50 {} p90 {} p99 {}",
            format_duration(latency.p50),
            format_duration(latency.p90),
            format_duration(latency.p99)
        ));
    }
    format!("{}: {}", head, parts.join(", "))
}

fn candidate_line(candidate: &CandidateComparison) -> String {
    let base = metrics_line(&candidate.metrics);
    if candidate.metrics.is_failed() {
        return base;
    }
    let efficiency = candidate
        .efficiency_percent
        .map_or_else(|| "n/a".to_owned(), |value| format!("{:.1}%", value));
    format!(
        "{}, speedup {}, efficiency {}, memory {}",
        base,
        format_ratio(candidate.speedup_ratio),
        efficiency,
        format_ratio(candidate.memory_ratio)
    )
}

fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "n/a".to_owned(), |value| format!("{:.2}x", value))
}

fn format_duration(duration: Duration) -> String {
    if duration >= Duration::from_secs(1) {
        format!("{:.3}s", duration.as_secs_f64())
    } else {
        format!("{:.3}ms", duration_ms(duration))
    }
}

fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn report_json(report: &ComparisonReport, context: &ReportContext) -> Value {
    let candidates: Vec<Value> = report.candidates.iter().map(candidate_json).collect();
    json!({
        "command": context.command,
        "shape": context.shape.as_str(),
        "task_count": context.task_count,
        "probe": context.probe,
        "available_parallelism": report.available_parallelism,
        "baseline": metrics_json(&report.baseline),
        "candidates": candidates,
        "diminishing_returns_point": report.diminishing_returns_point,
        "parity_point": report.parity_point.as_ref().map(parity_json),
    })
}

fn candidate_json(candidate: &CandidateComparison) -> Value {
    json!({
        "metrics": metrics_json(&candidate.metrics),
        "speedup_ratio": candidate.speedup_ratio,
        "efficiency_percent": candidate.efficiency_percent,
        "memory_ratio": candidate.memory_ratio,
    })
}

fn parity_json(parity: &ParityPoint) -> Value {
    json!({
        "strategy": parity.strategy,
        "worker_count": parity.worker_count,
        "memory_ratio": parity.memory_ratio,
    })
}

fn metrics_json(metrics: &RunMetrics) -> Value {
    json!({
        "strategy": metrics.strategy,
        "worker_count": metrics.worker_count,
        "wall_time_ms": metrics.wall_time.map(duration_ms),
        "projected_wall_time_ms": metrics.projected_wall_time().map(duration_ms),
        "peak_memory_bytes": metrics.peak_memory_bytes,
        "result_count": metrics.result_count,
        "failure_count": metrics.failure_count,
        "timeout_count": metrics.timeout_count,
        "latency": metrics.latency.as_ref().map(latency_json),
        "sample": metrics.sample.map(|sample| json!({
            "measured_tasks": sample.measured_tasks,
            "total_tasks": sample.total_tasks,
        })),
        "error": metrics.error,
    })
}

fn latency_json(latency: &LatencySummary) -> Value {
    json!({
        "min_ms": duration_ms(latency.min),
        "mean_ms": duration_ms(latency.mean),
        "p50_ms": duration_ms(latency.p50),
        "p90_ms": duration_ms(latency.p90),
        "p99_ms": duration_ms(latency.p99),
        "max_ms": duration_ms(latency.max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SampleInfo;
    use crate::report::ReportComparator;

    fn completed(strategy: &str, workers: usize, wall_ms: u64) -> RunMetrics {
        RunMetrics {
            strategy: strategy.to_owned(),
            worker_count: workers,
            wall_time: Some(Duration::from_millis(wall_ms)),
            peak_memory_bytes: Some(2048),
            result_count: 10,
            failure_count: 0,
            timeout_count: 0,
            latency: None,
            sample: None,
            error: None,
        }
    }

    fn context() -> ReportContext {
        ReportContext {
            command: "sweep",
            shape: ShapeKind::Cpu,
            task_count: 10,
            probe: "alloc",
        }
    }

    fn sample_report() -> ComparisonReport {
        let baseline = completed("sequential", 1, 1000);
        let candidates = vec![
            completed("process-pool", 2, 500),
            RunMetrics::failed("process-pool", 4, "spawn failed".to_owned()),
        ];
        ReportComparator::new(4).compare(&baseline, &candidates)
    }

    #[test]
    fn text_report_lists_every_candidate() -> Result<(), String> {
        let lines = report_lines(&sample_report(), &context());
        let text = lines.join("\n");
        if !text.contains("stratbench sweep: cpu workload, 10 tasks, probe alloc, 4 CPUs") {
            return Err(format!("Missing header: {}", text));
        }
        if !text.contains("process-pool (2 workers): wall 500.000ms") {
            return Err(format!("Missing candidate wall time: {}", text));
        }
        if !text.contains("speedup 2.00x, efficiency 100.0%, memory 1.00x") {
            return Err(format!("Missing ratios: {}", text));
        }
        if !text.contains("process-pool (4 workers): FAILED: spawn failed") {
            return Err(format!("Missing failed run: {}", text));
        }
        if !text.contains("peak memory 2.0 KiB") {
            return Err(format!("Missing memory: {}", text));
        }
        Ok(())
    }

    #[test]
    fn json_report_marks_failed_runs_with_nulls() -> Result<(), String> {
        let value = report_json(&sample_report(), &context());
        let failed = value
            .get("candidates")
            .and_then(|candidates| candidates.get(1))
            .ok_or_else(|| "Missing failed candidate".to_owned())?;
        if failed.get("speedup_ratio") != Some(&Value::Null) {
            return Err(format!("Expected null speedup: {}", failed));
        }
        let error = failed
            .get("metrics")
            .and_then(|metrics| metrics.get("error"))
            .and_then(Value::as_str);
        if error != Some("spawn failed") {
            return Err(format!("Unexpected error field: {:?}", error));
        }
        if value.get("available_parallelism").and_then(Value::as_u64) != Some(4) {
            return Err("Unexpected available_parallelism".to_owned());
        }
        Ok(())
    }

    #[test]
    fn json_report_includes_projected_baseline() -> Result<(), String> {
        let baseline = completed("sequential", 1, 100).with_sample(SampleInfo {
            measured_tasks: 1,
            total_tasks: 10,
        });
        let report = ReportComparator::new(2).compare(&baseline, &[]);
        let projected = report_json(&report, &context())
            .get("baseline")
            .and_then(|baseline| baseline.get("projected_wall_time_ms"))
            .and_then(Value::as_f64)
            .ok_or_else(|| "Missing projected wall time".to_owned())?;
        if (projected - 1000.0).abs() > 0.5 {
            return Err(format!("Unexpected projection: {}", projected));
        }
        let lines = report_lines(&report, &context()).join("\n");
        if !lines.contains("(projected 1.000s from 1/10 tasks)") {
            return Err(format!("Missing projection line: {}", lines));
        }
        Ok(())
    }
}
