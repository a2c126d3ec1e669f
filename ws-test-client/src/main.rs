use clap::Parser;
use colored::*;

mod output;
mod scenarios;
mod ws_client;

use output::print_test_summary;

#[derive(Parser)]
#[command(name = "ws-test-client")]
#[command(about = "Admin WebSocket Integration Testing Tool")]
struct Cli {
    /// WebSocket URL of the admin endpoint (e.g., ws://localhost:8080/admin/ws)
    #[arg(long, default_value = "ws://127.0.0.1:8080/admin/ws")]
    url: String,

    /// Test scenario to run
    #[arg(long, value_enum, default_value = "all")]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Connect and check the welcome message
    ConnectionTest,
    /// Application-level ping/pong round trip
    PingTest,
    /// Subscribe/unsubscribe acknowledgements
    SubscriptionTest,
    /// Run every scenario
    All,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== TEST PHASE ===".bright_white().bold());
    println!("{} Target: {}", "→".blue(), cli.url);

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::ConnectionTest => {
            results.push(scenarios::test_connection(&cli.url).await);
        }
        ScenarioChoice::PingTest => {
            results.push(scenarios::test_ping(&cli.url).await);
        }
        ScenarioChoice::SubscriptionTest => {
            results.push(scenarios::test_subscription(&cli.url).await);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_connection(&cli.url).await);
            results.push(scenarios::test_ping(&cli.url).await);
            results.push(scenarios::test_subscription(&cli.url).await);
        }
    }

    // Print summary
    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);

    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}
