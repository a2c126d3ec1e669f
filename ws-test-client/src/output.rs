use colored::*;
use std::time::Duration;

pub struct TestResult {
    pub scenario_name: String,
    pub passed: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

pub fn print_test_summary(results: &[TestResult]) {
    for result in results {
        let status = if result.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!(
            "[{}] {} ({} ms)",
            status,
            result.scenario_name,
            result.duration.as_millis()
        );
        if let Some(message) = &result.message {
            println!("      {}", message.dimmed());
        }
    }

    let passed = results.iter().filter(|r| r.passed).count();
    println!("\n{}/{} scenario(s) passed", passed, results.len());
}
