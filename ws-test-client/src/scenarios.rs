use crate::output::TestResult;
use crate::ws_client::Connection;
use anyhow::{ensure, Result};
use colored::*;
use serde_json::json;
use std::future::Future;
use std::time::{Duration, Instant};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

async fn run<F>(scenario_name: &str, scenario: F) -> TestResult
where
    F: Future<Output = Result<()>>,
{
    println!("\n{} Running {}...", "→".blue(), scenario_name.bold());
    let start = Instant::now();
    let outcome = scenario.await;
    let duration = start.elapsed();

    match outcome {
        Ok(()) => {
            println!("{} {} passed", "✓".green(), scenario_name);
            TestResult {
                scenario_name: scenario_name.to_string(),
                passed: true,
                message: None,
                duration,
            }
        }
        Err(e) => {
            println!("{} {} failed: {:#}", "✗".red(), scenario_name, e);
            TestResult {
                scenario_name: scenario_name.to_string(),
                passed: false,
                message: Some(format!("{e:#}")),
                duration,
            }
        }
    }
}

/// Connects and expects `connection_established` as the first message.
pub async fn test_connection(url: &str) -> TestResult {
    run("connection-test", async {
        let mut connection = Connection::establish(url, "connection-test".to_string()).await?;
        let welcome = connection
            .wait_for_event("connection_established", EVENT_TIMEOUT)
            .await?;

        let client_id = welcome.payload["client_id"].as_str().unwrap_or_default();
        ensure!(
            client_id.starts_with("client_"),
            "unexpected client id {client_id:?}"
        );
        ensure!(
            welcome.payload["message"] == "Connected to admin panel",
            "unexpected welcome message {}",
            welcome.payload["message"]
        );
        println!("  {} assigned client id {}", "•".dimmed(), client_id);

        connection.close().await
    })
    .await
}

/// Sends an application-level ping and expects a pong.
pub async fn test_ping(url: &str) -> TestResult {
    run("ping-test", async {
        let mut connection = Connection::establish(url, "ping-test".to_string()).await?;
        connection
            .wait_for_event("connection_established", EVENT_TIMEOUT)
            .await?;

        let sent = Instant::now();
        connection.send("ping", json!(null)).await?;
        let pong = connection.wait_for_event("pong", EVENT_TIMEOUT).await?;
        ensure!(
            pong.payload["timestamp"].is_string(),
            "pong payload has no timestamp"
        );
        println!(
            "  {} round trip {} ms",
            "•".dimmed(),
            pong.timestamp.duration_since(sent).as_millis()
        );

        connection.close().await
    })
    .await
}

/// Subscribes and unsubscribes, checking both acknowledgements echo the topics.
pub async fn test_subscription(url: &str) -> TestResult {
    run("subscription-test", async {
        let mut connection = Connection::establish(url, "subscription-test".to_string()).await?;
        let welcome = connection
            .wait_for_event("connection_established", EVENT_TIMEOUT)
            .await?;
        let topics = json!(["widget_status", "system_metrics"]);

        connection
            .send("subscribe", json!({ "topics": topics }))
            .await?;
        let ack = connection
            .wait_for_event("subscription_confirmed", EVENT_TIMEOUT)
            .await?;
        ensure!(
            ack.payload["topics"] == topics,
            "subscription ack topics {} do not match",
            ack.payload["topics"]
        );
        ensure!(
            ack.payload["client_id"] == welcome.payload["client_id"],
            "subscription ack carries another client id"
        );

        connection
            .send("unsubscribe", json!({ "topics": ["system_metrics"] }))
            .await?;
        let ack = connection
            .wait_for_event("unsubscription_confirmed", EVENT_TIMEOUT)
            .await?;
        ensure!(
            ack.payload["topics"] == json!(["system_metrics"]),
            "unsubscription ack topics {} do not match",
            ack.payload["topics"]
        );

        connection.close().await
    })
    .await
}
