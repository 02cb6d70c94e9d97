use anyhow::Result;
use rosmon_agent::agent::Agent;
use rosmon_agent::config::AgentConfig;
use std::path::Path;
use tempfile::TempDir;

fn write_snapshot(dir: &Path, name: &str, body: &str) -> Result<()> {
    std::fs::write(dir.join(name), body)?;
    Ok(())
}

fn build_config(dir: &TempDir) -> Result<AgentConfig> {
    let root = dir.path().display();
    let toml = format!(
        r#"
        fetch_timeout_secs = 2
        max_concurrent = 2
        output_path = "{root}/rosmon.prom"

        [[devices]]
        name = "router1"
        address = "10.0.0.1"
        snapshot = "{root}/router1.json"

        [[devices]]
        name = "router2"
        address = "10.0.0.2"
        snapshot = "{root}/router2.json"

        [[devices]]
        name = "router3"
        address = "10.0.0.3"
        snapshot = "{root}/missing.json"
        "#
    );
    AgentConfig::parse(&toml)
}

#[tokio::test]
async fn tick_collects_healthy_devices_and_reports_broken_ones() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_snapshot(
        dir.path(),
        "router1.json",
        r#"{"/ip/hotspot/active/print": [
            {"user": "alice", "name": "wifi1", "comment": "", "uptime": "1h2m",
             "bytes-in": "1024", "bytes-out": "2048", "packets-in": "10", "packets-out": ""}
        ]}"#,
    )?;
    write_snapshot(
        dir.path(),
        "router2.json",
        r#"{"/ip/hotspot/active/print": [
            {"user": "bob", "comment": "lobby", "bytes-in": "abc", "bytes-out": "7",
             "packets-in": "1", "packets-out": "2"}
        ]}"#,
    )?;
    let config = build_config(&dir)?;
    let mut agent = Agent::from_config(&config)?;

    let summary = agent.tick().await?;

    assert_eq!(summary.report.devices, 3);
    assert_eq!(summary.report.failures.len(), 1);
    assert_eq!(summary.report.failures[0].device, "router3");
    assert_eq!(summary.report.failures[0].collector, "hotspot");

    // router1: three counters (packets-out empty); router2: three (bytes-in malformed).
    assert_eq!(summary.samples.len(), 6);
    assert!(summary.samples.iter().all(|s| s.name() != "mikrotik_user_uptime"));
    let alice_bytes_in = summary
        .samples
        .iter()
        .find(|s| s.name() == "mikrotik_user_bytes_in" && s.label("user") == Some("alice"))
        .expect("alice bytes-in sample");
    assert_eq!(alice_bytes_in.value(), 1024.0);
    assert_eq!(
        alice_bytes_in.labels().values(),
        ["router1", "10.0.0.1", "alice", ""]
    );

    let text = std::fs::read_to_string(dir.path().join("rosmon.prom"))?;
    assert!(text.contains(
        "mikrotik_user_bytes_out_total{name=\"router2\",address=\"10.0.0.2\",user=\"bob\",comment=\"lobby\"} 7"
    ));
    assert!(!text.contains("mikrotik_user_bytes_in_total{name=\"router2\""));
    assert!(!text.contains("mikrotik_user_uptime_total"));
    Ok(())
}

#[tokio::test]
async fn tick_starts_fresh_on_every_pass() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_snapshot(
        dir.path(),
        "router1.json",
        r#"{"/ip/hotspot/active/print": [{"user": "alice", "bytes-in": "1"}]}"#,
    )?;
    write_snapshot(dir.path(), "router2.json", r#"{"/ip/hotspot/active/print": []}"#)?;
    let config = build_config(&dir)?;
    let mut agent = Agent::from_config(&config)?;

    let first = agent.tick().await?;
    assert_eq!(first.samples.len(), 1);

    write_snapshot(
        dir.path(),
        "router1.json",
        r#"{"/ip/hotspot/active/print": [{"user": "alice", "bytes-in": ""}]}"#,
    )?;
    let second = agent.tick().await?;
    assert!(second.samples.is_empty());

    let text = std::fs::read_to_string(dir.path().join("rosmon.prom"))?;
    assert!(!text.contains("mikrotik_user_"));
    Ok(())
}

#[tokio::test]
async fn tick_keeps_every_sample_when_pass_outgrows_channel() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let sessions: Vec<String> = (0..2)
        .map(|i| {
            format!(
                r#"{{"user": "u{i}", "bytes-in": "1", "bytes-out": "2", "packets-in": "3", "packets-out": "4"}}"#
            )
        })
        .collect();
    write_snapshot(
        dir.path(),
        "router1.json",
        &format!(r#"{{"/ip/hotspot/active/print": [{}]}}"#, sessions.join(",")),
    )?;
    let root = dir.path().display();
    let config = AgentConfig::parse(&format!(
        r#"
        channel_capacity = 4

        [[devices]]
        name = "router1"
        address = "10.0.0.1"
        snapshot = "{root}/router1.json"
        "#
    ))?;
    let mut agent = Agent::from_config(&config)?;

    let summary = agent.tick().await?;

    assert!(summary.report.is_clean());
    assert_eq!(summary.samples.len(), 8);
    Ok(())
}
