//! Reshaping controller records into compact summaries

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Placeholder for values the controller did not report
pub const NOT_AVAILABLE: &str = "N/A";

/// Device types that act as the site gateway
pub const GATEWAY_TYPES: [&str; 2] = ["ugw", "udm"];

/// Below this share of online devices the analysis flags availability
const AVAILABILITY_TARGET_PERCENT: f64 = 95.0;

/// More wireless than this many clients per wired client suggests adding APs
const WIRELESS_PER_WIRED_LIMIT: usize = 3;

// ============================================================================
// Lenient field decoding
// ============================================================================

/// Field decoders accepting `null` and floats where integers or booleans are usual
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Non-negative integer; floats are truncated, anything else is `None`
    pub fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }))
    }

    pub fn u64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(opt_u64(d)?.unwrap_or_default())
    }

    /// Signed integer; floats are truncated, anything else is `None`
    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)))
    }

    /// `true`, or a non-zero number; `null` and anything else is `false`
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(opt_flag(d)?.unwrap_or_default())
    }

    pub fn opt_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
            _ => None,
        })
    }

    /// `null` becomes the empty list
    pub fn list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items,
            _ => Vec::new(),
        })
    }
}

// ============================================================================
// Controller records
// ============================================================================

/// Row of `stat/device`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Device {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub mac: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub model: Option<String>,
    pub version: Option<String>,
    pub ip: Option<String>,
    /// 1 means connected
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub state: Option<i64>,
    /// Seconds
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub uptime: Option<u64>,
    /// UNIX seconds
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub last_seen: Option<i64>,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.state == Some(1)
    }

    pub fn is_gateway(&self) -> bool {
        self.device_type
            .as_deref()
            .is_some_and(|t| GATEWAY_TYPES.contains(&t))
    }

    fn status(&self) -> &'static str {
        if self.is_online() {
            "online"
        } else {
            "offline"
        }
    }
}

/// Row of `stat/sta` or `rest/user`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientStation {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub mac: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_wired: bool,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub last_seen: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub rx_bytes: Option<u64>,
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub tx_bytes: Option<u64>,
}

/// Row of `stat/health`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HealthSubsystem {
    pub subsystem: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::u64_or_zero")]
    pub num_user: u64,
    #[serde(deserialize_with = "lenient::u64_or_zero")]
    pub num_guest: u64,
    #[serde(deserialize_with = "lenient::u64_or_zero")]
    pub num_iot: u64,
}

impl HealthSubsystem {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

/// Row of `stat/sysinfo`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub version: Option<String>,
    pub build: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    pub dns: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_u64")]
    pub uptime: Option<u64>,
    pub timezone: Option<String>,
}

/// Row of `rest/vpnclient`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VpnClient {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub enabled: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub connected: bool,
    #[serde(rename = "type")]
    pub client_type: Option<String>,
    pub server: Option<String>,
    pub username: Option<String>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub last_connected: Option<i64>,
}

/// Row of `rest/portforward`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortForward {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub enabled: bool,
    pub fwd_port: Option<Value>,
    pub fwd_port_to: Option<Value>,
    pub fwd_ip: Option<String>,
    pub proto: Option<String>,
    pub src: Option<String>,
    pub dst: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub log: bool,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub date_created: Option<i64>,
}

/// Row of `rest/firewallzone`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirewallZone {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_flag")]
    pub enabled: Option<bool>,
    #[serde(deserialize_with = "lenient::list")]
    pub interfaces: Vec<Value>,
    #[serde(deserialize_with = "lenient::list")]
    pub networks: Vec<Value>,
}

// ============================================================================
// Formatting
// ============================================================================

/// Whole hours, e.g. `"27 hours"`; zero or missing uptime is `N/A`
pub fn format_uptime(seconds: Option<u64>) -> String {
    match seconds {
        Some(s) if s > 0 => format!("{} hours", s / 3600),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// RFC 3339 UTC with milliseconds, or `fallback` for zero/missing/out-of-range
pub fn format_timestamp_or(unix_seconds: Option<i64>, fallback: &str) -> String {
    unix_seconds
        .filter(|&t| t != 0)
        .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| fallback.to_string())
}

pub fn format_timestamp(unix_seconds: Option<i64>) -> String {
    format_timestamp_or(unix_seconds, NOT_AVAILABLE)
}

/// Byte counter in MB rounded to two decimals, e.g. `"1.5 MB"`
pub fn format_megabytes(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) if b > 0 => {
            let mb = b as f64 / 1024.0 / 1024.0;
            format!("{} MB", round2(mb))
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

fn or_na(value: &Option<String>) -> Value {
    match value {
        Some(v) if !v.is_empty() => json!(v),
        _ => json!(NOT_AVAILABLE),
    }
}

// ============================================================================
// Per-record summaries
// ============================================================================

pub fn device_summary(device: &Device) -> Value {
    json!({
        "id": device.id,
        "mac": device.mac,
        "name": device.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unnamed"),
        "type": device.device_type,
        "status": device.status(),
        "ip": device.ip,
        "model": device.model,
        "version": device.version,
        "uptime": format_uptime(device.uptime),
        "last_seen": format_timestamp(device.last_seen),
    })
}

pub fn client_summary(client: &ClientStation) -> Value {
    json!({
        "id": client.id,
        "mac": client.mac,
        "hostname": client.hostname.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unnamed"),
        "ip": client.ip,
        "connection_type": if client.is_wired { "wired" } else { "wifi" },
        "last_seen": format_timestamp(client.last_seen),
        "rx_bytes": format_megabytes(client.rx_bytes),
        "tx_bytes": format_megabytes(client.tx_bytes),
    })
}

pub fn health_summary(item: &HealthSubsystem) -> Value {
    json!({
        "subsystem": item.subsystem,
        "status": item.status,
        "users": {
            "total": item.num_user,
            "guest": item.num_guest,
            "iot": item.num_iot,
        }
    })
}

pub fn system_info_summary(info: &SystemInfo) -> Value {
    json!({
        "version": info.version,
        "build": info.build,
        "hostname": info.hostname,
        "ip": info.ip,
        "netmask": info.netmask,
        "gateway": info.gateway,
        "dns": info.dns,
        "uptime": format_uptime(info.uptime),
        "timezone": info.timezone,
    })
}

pub fn vpn_client_summary(client: &VpnClient) -> Value {
    json!({
        "id": client.id,
        "name": client.name,
        "enabled": client.enabled,
        "connected": client.connected,
        "type": client.client_type,
        "server": client.server,
        "username": client.username,
        "last_connected": format_timestamp_or(client.last_connected, "Never"),
    })
}

pub fn port_forward_summary(rule: &PortForward) -> Value {
    json!({
        "id": rule.id,
        "name": rule.name,
        "enabled": rule.enabled,
        "src_port": rule.fwd_port,
        "dst_port": rule.fwd_port_to,
        "dst_ip": rule.fwd_ip,
        "protocol": rule.proto,
        "src": rule.src,
        "dst": rule.dst,
        "log": rule.log,
        "created": format_timestamp(rule.date_created),
    })
}

pub fn firewall_zone_summary(zone: &FirewallZone) -> Value {
    json!({
        "id": zone.id,
        "name": zone.name,
        "enabled": zone.enabled,
        "interfaces": zone.interfaces,
        "networks": zone.networks,
    })
}

// ============================================================================
// Aggregates
// ============================================================================

/// `Healthy` only when every subsystem reports `ok`
pub fn overall_status(health: &[HealthSubsystem]) -> &'static str {
    if health.iter().all(HealthSubsystem::is_ok) {
        "Healthy"
    } else {
        "Issues detected"
    }
}

/// Device count per type code
pub fn devices_by_type(devices: &[Device]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for device in devices {
        let key = device
            .device_type
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Online/offline counts with a whole-number availability percentage
pub fn device_health(devices: &[Device], health: &[HealthSubsystem]) -> Value {
    let total = devices.len();
    let online = devices.iter().filter(|d| d.is_online()).count();

    json!({
        "device_summary": {
            "total": total,
            "online": online,
            "offline": total - online,
            "uptime_percentage": percent(online, total).round() as u64,
        },
        "devices_by_type": devices_by_type(devices),
        "health_status": health
            .iter()
            .map(|h| json!({ "subsystem": h.subsystem, "status": h.status }))
            .collect::<Vec<_>>(),
    })
}

/// Gateway state plus WAN/WWW subsystem health
pub fn isp_metrics(devices: &[Device], health: &[HealthSubsystem]) -> Value {
    let gateway = devices.iter().find(|d| d.is_gateway());
    let subsystem_status = |name: &str| {
        health
            .iter()
            .find(|h| h.subsystem.as_deref() == Some(name))
            .and_then(|h| h.status.clone())
            .unwrap_or_else(|| "unknown".to_string())
    };

    json!({
        "gateway_status": gateway.map_or("not found", Device::status),
        "gateway_model": gateway.map_or(json!(NOT_AVAILABLE), |g| or_na(&g.model)),
        "gateway_version": gateway.map_or(json!(NOT_AVAILABLE), |g| or_na(&g.version)),
        "gateway_uptime": format_uptime(gateway.and_then(|g| g.uptime)),
        "wan_health": subsystem_status("wan"),
        "www_health": subsystem_status("www"),
    })
}

/// Device availability, client mix, subsystem health and recommendations
pub fn network_analysis(
    devices: &[Device],
    clients: &[ClientStation],
    health: &[HealthSubsystem],
) -> Value {
    let total_devices = devices.len();
    let online_devices = devices.iter().filter(|d| d.is_online()).count();
    let availability = percent(online_devices, total_devices);

    let total_clients = clients.len();
    let wired_clients = clients.iter().filter(|c| c.is_wired).count();
    let wireless_clients = total_clients - wired_clients;

    let issues: Vec<&HealthSubsystem> = health.iter().filter(|h| !h.is_ok()).collect();

    let mut recommendations = Vec::new();
    if availability < AVAILABILITY_TARGET_PERCENT {
        recommendations.push("Check offline devices to improve network availability".to_string());
    }
    if !issues.is_empty() {
        let names: Vec<&str> = issues
            .iter()
            .map(|h| h.subsystem.as_deref().unwrap_or("unknown"))
            .collect();
        recommendations.push(format!("Resolve health issues in: {}", names.join(", ")));
    }
    if wireless_clients > wired_clients * WIRELESS_PER_WIRED_LIMIT {
        recommendations
            .push("Consider adding access points to spread the WiFi load".to_string());
    }

    json!({
        "device_performance": {
            "total_devices": total_devices,
            "online_devices": online_devices,
            "uptime_percentage": round2(availability),
        },
        "client_distribution": {
            "total_clients": total_clients,
            "wired_clients": wired_clients,
            "wireless_clients": wireless_clients,
            "wireless_ratio": percent(wireless_clients, total_clients).round() as u64,
        },
        "health_status": {
            "total_subsystems": health.len(),
            "healthy_subsystems": health.len() - issues.len(),
            "issues": issues
                .iter()
                .map(|h| json!({ "subsystem": h.subsystem, "status": h.status }))
                .collect::<Vec<_>>(),
        },
        "recommendations": recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn device(kind: &str, state: i64) -> Device {
        Device {
            device_type: Some(kind.to_string()),
            state: Some(state),
            ..Default::default()
        }
    }

    #[test]
    fn test_records_tolerate_null_and_float_fields() {
        use crate::types::records;

        let health: Vec<HealthSubsystem> = records(&json!({
            "data": [{ "subsystem": "wan", "status": "ok", "num_user": null, "num_guest": 2.7 }]
        }))
        .unwrap();
        assert_eq!(health[0].num_user, 0);
        assert_eq!(health[0].num_guest, 2);
        assert!(health[0].is_ok());

        let clients: Vec<ClientStation> = records(&json!({
            "data": [
                { "hostname": "laptop", "is_wired": null, "rx_bytes": 1572864.0 },
                { "hostname": "nas", "is_wired": true, "last_seen": "yesterday" }
            ]
        }))
        .unwrap();
        assert!(!clients[0].is_wired);
        assert_eq!(clients[0].rx_bytes, Some(1_572_864));
        assert!(clients[1].is_wired);
        assert_eq!(clients[1].last_seen, None);

        let devices: Vec<Device> = records(&json!({
            "data": [{ "name": "ap", "state": 1.0, "uptime": 12.5, "last_seen": null }]
        }))
        .unwrap();
        assert!(devices[0].is_online());
        assert_eq!(devices[0].uptime, Some(12));
        assert_eq!(devices[0].last_seen, None);

        let vpn: Vec<VpnClient> = records(&json!({
            "data": [{ "name": "office", "enabled": null, "connected": 1 }]
        }))
        .unwrap();
        assert!(!vpn[0].enabled);
        assert!(vpn[0].connected);

        let zones: Vec<FirewallZone> = records(&json!({
            "data": [{ "name": "lan", "enabled": null, "interfaces": null }]
        }))
        .unwrap();
        assert_eq!(zones[0].enabled, None);
        assert!(zones[0].interfaces.is_empty());
    }

    #[test_case(None, "N/A" ; "missing")]
    #[test_case(Some(0), "N/A" ; "zero")]
    #[test_case(Some(3599), "0 hours" ; "under an hour")]
    #[test_case(Some(97_200), "27 hours" ; "whole hours")]
    fn test_format_uptime(seconds: Option<u64>, expected: &str) {
        assert_eq!(format_uptime(seconds), expected);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(Some(1_700_000_000)),
            "2023-11-14T22:13:20.000Z"
        );
        assert_eq!(format_timestamp(None), "N/A");
        assert_eq!(format_timestamp(Some(0)), "N/A");
        assert_eq!(format_timestamp_or(None, "Never"), "Never");
    }

    #[test_case(Some(1_572_864), "1.5 MB" ; "fractional")]
    #[test_case(Some(2_097_152), "2 MB" ; "whole")]
    #[test_case(Some(1_234_567), "1.18 MB" ; "rounded")]
    #[test_case(Some(0), "N/A" ; "zero")]
    #[test_case(None, "N/A" ; "missing")]
    fn test_format_megabytes(bytes: Option<u64>, expected: &str) {
        assert_eq!(format_megabytes(bytes), expected);
    }

    #[test]
    fn test_device_summary() {
        let device: Device = serde_json::from_value(json!({
            "_id": "d1",
            "mac": "aa:bb:cc:dd:ee:ff",
            "type": "uap",
            "state": 1,
            "uptime": 7200,
            "model": "U6-Pro",
            "unknown_field": {"ignored": true}
        }))
        .unwrap();

        let summary = device_summary(&device);
        assert_eq!(summary["name"], "Unnamed");
        assert_eq!(summary["status"], "online");
        assert_eq!(summary["uptime"], "2 hours");
        assert_eq!(summary["last_seen"], "N/A");
        assert_eq!(summary["model"], "U6-Pro");
    }

    #[test]
    fn test_client_summary() {
        let client = ClientStation {
            hostname: Some("laptop".to_string()),
            is_wired: true,
            rx_bytes: Some(1_048_576),
            ..Default::default()
        };
        let summary = client_summary(&client);
        assert_eq!(summary["connection_type"], "wired");
        assert_eq!(summary["rx_bytes"], "1 MB");
        assert_eq!(summary["tx_bytes"], "N/A");
    }

    #[test]
    fn test_overall_status() {
        let ok = HealthSubsystem {
            subsystem: Some("wan".to_string()),
            status: Some("ok".to_string()),
            ..Default::default()
        };
        let warn = HealthSubsystem {
            subsystem: Some("wlan".to_string()),
            status: Some("warning".to_string()),
            ..Default::default()
        };
        assert_eq!(overall_status(&[]), "Healthy");
        assert_eq!(overall_status(&[ok.clone()]), "Healthy");
        assert_eq!(overall_status(&[ok, warn]), "Issues detected");
    }

    #[test]
    fn test_device_health_counts() {
        let devices = vec![device("uap", 1), device("uap", 0), device("usw", 1)];
        let value = device_health(&devices, &[]);
        assert_eq!(value["device_summary"]["total"], 3);
        assert_eq!(value["device_summary"]["offline"], 1);
        assert_eq!(value["device_summary"]["uptime_percentage"], 67);
        assert_eq!(value["devices_by_type"], json!({"uap": 2, "usw": 1}));
    }

    #[test]
    fn test_isp_metrics_without_gateway() {
        let value = isp_metrics(&[device("uap", 1)], &[]);
        assert_eq!(value["gateway_status"], "not found");
        assert_eq!(value["gateway_model"], "N/A");
        assert_eq!(value["wan_health"], "unknown");
    }

    #[test]
    fn test_isp_metrics_with_gateway() {
        let mut gateway = device("udm", 1);
        gateway.model = Some("UDM-Pro".to_string());
        gateway.uptime = Some(36_000);
        let wan = HealthSubsystem {
            subsystem: Some("wan".to_string()),
            status: Some("ok".to_string()),
            ..Default::default()
        };

        let value = isp_metrics(&[device("uap", 1), gateway], &[wan]);
        assert_eq!(value["gateway_status"], "online");
        assert_eq!(value["gateway_model"], "UDM-Pro");
        assert_eq!(value["gateway_uptime"], "10 hours");
        assert_eq!(value["wan_health"], "ok");
        assert_eq!(value["www_health"], "unknown");
    }

    #[test]
    fn test_network_analysis_recommendations() {
        let devices = vec![device("uap", 1), device("uap", 0)];
        let clients: Vec<ClientStation> = (0..4).map(|_| ClientStation::default()).collect();
        let health = vec![HealthSubsystem {
            subsystem: Some("wlan".to_string()),
            status: Some("error".to_string()),
            ..Default::default()
        }];

        let value = network_analysis(&devices, &clients, &health);
        assert_eq!(value["device_performance"]["uptime_percentage"], 50.0);
        assert_eq!(value["client_distribution"]["wireless_ratio"], 100);
        assert_eq!(value["health_status"]["healthy_subsystems"], 0);

        let recommendations = value["recommendations"].as_array().unwrap();
        assert_eq!(recommendations.len(), 3);
        assert_eq!(recommendations[1], "Resolve health issues in: wlan");
    }

    #[test]
    fn test_network_analysis_healthy_site() {
        let devices = vec![device("uap", 1)];
        let clients = vec![ClientStation {
            is_wired: true,
            ..Default::default()
        }];
        let value = network_analysis(&devices, &clients, &[]);
        assert_eq!(value["recommendations"], json!([]));
    }
}
