use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use crate::scenarios::ScenarioResult;

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Scenario Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "===========================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    // Overall stats
    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    #[allow(clippy::cast_precision_loss)]
    let success_rate = if total_tests == 0 {
        0.0
    } else {
        (passed_tests as f64 / total_tests as f64) * 100.0
    };
    writeln!(out, "Success rate: {success_rate:.1}%")?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    // Individual results
    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{status} {} (seed {})",
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    // Performance summary
    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Full Adventure".to_string(),
            seed: 42,
            passed,
            iterations_run: 3,
            successful_iterations: if passed { 3 } else { 2 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["Iteration 3 (seed 44): score 7 but bot hit 8".to_string()]
            },
            average_duration: Duration::from_millis(4),
        }
    }

    #[test]
    fn console_report_lists_failures() {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        generate_console_report(
            &mut buf,
            &[sample_result(true), sample_result(false)],
            Duration::from_millis(20),
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Total scenarios: 2"));
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("score 7 but bot hit 8"));
        assert!(text.contains("Performance Summary"));
    }

    #[test]
    fn console_report_handles_no_results() {
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &[], Duration::ZERO).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Success rate: 0.0%"));
        assert!(!text.contains("Performance Summary"));
    }

    #[test]
    fn json_report_round_trips() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &[sample_result(false)]).unwrap();
        let parsed: Vec<ScenarioResult> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(!parsed[0].passed);
        assert_eq!(parsed[0].seed, 42);
    }
}
