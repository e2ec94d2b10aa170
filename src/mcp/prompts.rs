//! Prompt templates seeded with live controller data

use crate::error::Result;
use crate::http::ControllerApi;
use crate::tools::summary::{format_timestamp_or, ClientStation, Device, HealthSubsystem};
use crate::types::{records, site_path};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::fmt::Write;

/// Rows listed per section before the remainder is summarized
const MAX_LISTED: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    NetworkAnalysis,
    DeviceTroubleshooting,
}

impl Prompt {
    pub const ALL: [Prompt; 2] = [Prompt::NetworkAnalysis, Prompt::DeviceTroubleshooting];

    pub fn name(self) -> &'static str {
        match self {
            Prompt::NetworkAnalysis => "network_analysis",
            Prompt::DeviceTroubleshooting => "device_troubleshooting",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Prompt::NetworkAnalysis => "Full analysis of the UniFi network",
            Prompt::DeviceTroubleshooting => "Troubleshooting guide for offline devices",
        }
    }

    /// Entry for `prompts/list`
    pub fn descriptor(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "arguments": []
        })
    }

    /// Render the prompt text from the current state of `site`
    pub async fn render(self, api: &dyn ControllerApi, site: &str, now: DateTime<Utc>) -> Result<String> {
        match self {
            Prompt::NetworkAnalysis => {
                let (devices, clients, health) = tokio::try_join!(
                    fetch::<Device>(api, site, "stat/device"),
                    fetch::<ClientStation>(api, site, "stat/sta"),
                    fetch::<HealthSubsystem>(api, site, "stat/health")
                )?;
                Ok(network_analysis_text(&devices, &clients, &health, now))
            }
            Prompt::DeviceTroubleshooting => {
                let devices = fetch::<Device>(api, site, "stat/device").await?;
                Ok(troubleshooting_text(&devices, now))
            }
        }
    }
}

async fn fetch<T: serde::de::DeserializeOwned>(
    api: &dyn ControllerApi,
    site: &str,
    resource: &str,
) -> Result<Vec<T>> {
    records(&api.get(&site_path(site, resource)).await?)
}

/// Payload of `prompts/list`
pub fn prompts_list_payload() -> Value {
    let prompts: Vec<Value> = Prompt::ALL.into_iter().map(Prompt::descriptor).collect();
    json!({ "prompts": prompts })
}

fn network_analysis_text(
    devices: &[Device],
    clients: &[ClientStation],
    health: &[HealthSubsystem],
    now: DateTime<Utc>,
) -> String {
    let mut text = format!(
        "UniFi network analysis - {} UTC\n\nDEVICES ({} total):\n",
        now.format(TIMESTAMP_FORMAT),
        devices.len()
    );

    for device in devices.iter().take(MAX_LISTED) {
        let status = if device.is_online() { "Online" } else { "Offline" };
        let _ = writeln!(
            text,
            "- {} ({}): {status}",
            device.name.as_deref().unwrap_or("Unnamed"),
            device.device_type.as_deref().unwrap_or("unknown")
        );
    }
    if devices.len() > MAX_LISTED {
        let _ = writeln!(text, "... and {} more devices", devices.len() - MAX_LISTED);
    }

    let _ = write!(text, "\nCLIENTS ({} total):\n", clients.len());
    for client in clients.iter().take(MAX_LISTED) {
        let label = client
            .hostname
            .as_deref()
            .or(client.mac.as_deref())
            .unwrap_or("Unknown");
        let connection = if client.is_wired { "Wired" } else { "WiFi" };
        let _ = writeln!(text, "- {label}: {connection}");
    }
    if clients.len() > MAX_LISTED {
        let _ = writeln!(text, "... and {} more clients", clients.len() - MAX_LISTED);
    }

    let _ = write!(text, "\nHEALTH ({} subsystems):\n", health.len());
    for item in health {
        let marker = if item.is_ok() { "[ok]" } else { "[!]" };
        let _ = writeln!(
            text,
            "{marker} {}: {}",
            item.subsystem.as_deref().unwrap_or("unknown"),
            item.status.as_deref().unwrap_or("unknown")
        );
    }

    text.push_str(
        "\nPlease analyze this UniFi network data and provide:\n\
         1. A summary of the overall state\n\
         2. Potential problems\n\
         3. Optimization recommendations\n\
         4. Security alerts, if any\n",
    );
    text
}

fn troubleshooting_text(devices: &[Device], now: DateTime<Utc>) -> String {
    let offline: Vec<&Device> = devices.iter().filter(|d| !d.is_online()).collect();

    let mut text = format!(
        "UniFi device diagnostics - {} UTC\n\nOFFLINE DEVICES ({} of {}):\n",
        now.format(TIMESTAMP_FORMAT),
        offline.len(),
        devices.len()
    );

    for device in &offline {
        let _ = write!(
            text,
            "\n- Device: {}\n  Type: {}\n  MAC: {}\n  Last seen: {}\n  IP: {}\n",
            device.name.as_deref().unwrap_or("Unnamed"),
            device.device_type.as_deref().unwrap_or("unknown"),
            device.mac.as_deref().unwrap_or("N/A"),
            format_timestamp_or(device.last_seen, "Never"),
            device.ip.as_deref().unwrap_or("N/A"),
        );
    }
    if offline.is_empty() {
        text.push_str("All devices are online!\n");
    }

    text.push_str(
        "\nPlease help with:\n\
         1. Diagnosing the offline devices\n\
         2. Troubleshooting steps\n\
         3. Recommended connectivity checks\n\
         4. Likely causes of the disconnections\n",
    );
    text
}
