//! Tool execution against the controller API
//!
//! Each handler issues its requests through [`ControllerApi`] and returns the
//! JSON payload the MCP layer hands back to the caller.

use super::args::*;
use super::summary::{self, ClientStation, Device, FirewallZone, HealthSubsystem};
use super::summary::{PortForward, SystemInfo, VpnClient};
use crate::error::{Result, ResultExt};
use crate::http::ControllerApi;
use crate::types::{raw_records, records, site_path, JsonObject, JsonValue};
use serde_json::json;
use tracing::{debug, info};

/// Run one tool call. `default_site` applies when the call names no site.
pub async fn execute(
    call: &ToolCall,
    api: &dyn ControllerApi,
    default_site: &str,
) -> Result<JsonValue> {
    let site = call.site().unwrap_or(default_site);
    debug!(tool = call.name(), site, "Executing tool");

    let result = match call {
        ToolCall::ListDevices(args) => list_devices(api, site, args)
            .await
            .context("Failed to list devices"),
        ToolCall::ListClients(args) => list_clients(api, site, args)
            .await
            .context("Failed to list clients"),
        ToolCall::GetSystemInfo(_) => get_system_info(api, site)
            .await
            .context("Failed to get system info"),
        ToolCall::GetHealthStatus(_) => get_health_status(api, site)
            .await
            .context("Failed to get health status"),
        ToolCall::GetDeviceHealthSummary(_) => get_device_health_summary(api, site)
            .await
            .context("Failed to get device health summary"),
        ToolCall::GetIspMetrics(args) => get_isp_metrics(api, site, args)
            .await
            .context("Failed to get ISP metrics"),
        ToolCall::AnalyzeNetworkPerformance(_) => analyze_network_performance(api, site)
            .await
            .context("Failed to analyze network performance"),
        ToolCall::QueryIspMetrics(args) => query_isp_metrics(api, site, args)
            .await
            .context("Failed to query metrics"),
        ToolCall::ListFirewallRules(_) => list_resource(api, site, "rest/firewallrule", "rules")
            .await
            .context("Failed to list firewall rules"),
        ToolCall::GetFirewallRule(args) => get_firewall_rule(api, site, args)
            .await
            .context("Failed to get firewall rule"),
        ToolCall::ListFirewallGroups(_) => {
            list_resource(api, site, "rest/firewallgroup", "groups")
                .await
                .context("Failed to list firewall groups")
        }
        ToolCall::CreateFirewallRule(args) => create_firewall_rule(api, site, args)
            .await
            .context("Failed to create firewall rule"),
        ToolCall::ListWlanConfigs(_) => list_resource(api, site, "rest/wlanconf", "wlans")
            .await
            .context("Failed to list WLAN configs"),
        ToolCall::ListNetworkConfigs(_) => {
            list_resource(api, site, "rest/networkconf", "networks")
                .await
                .context("Failed to list network configs")
        }
        ToolCall::CreateQosRule(args) => create_qos_rule(api, site, args)
            .await
            .context("Failed to create QoS rule"),
        ToolCall::ToggleQosRule(args) => toggle(api, site, "rest/qosrule", "QoS rule", args)
            .await
            .context("Failed to update QoS rule"),
        ToolCall::ListVpnClients(args) => list_vpn_clients(api, site, args)
            .await
            .context("Failed to list VPN clients"),
        ToolCall::UpdateVpnClientState(args) => update_vpn_client_state(api, site, args)
            .await
            .context("Failed to update VPN client"),
        ToolCall::ListPortForwards(_) => list_port_forwards(api, site)
            .await
            .context("Failed to list port forwards"),
        ToolCall::CreatePortForward(args) => create_port_forward(api, site, args)
            .await
            .context("Failed to create port forward"),
        ToolCall::TogglePortForward(args) => {
            toggle(api, site, "rest/portforward", "Port forward", args)
                .await
                .context("Failed to update port forward")
        }
        ToolCall::CreateTrafficRoute(args) => create_traffic_route(api, site, args)
            .await
            .context("Failed to create traffic route"),
        ToolCall::UpdateTrafficRoute(args) => update_traffic_route(api, site, args)
            .await
            .context("Failed to update traffic route"),
        ToolCall::CreateFirewallPolicy(args) => create_firewall_policy(api, site, args)
            .await
            .context("Failed to create firewall policy"),
        ToolCall::ListFirewallZones(_) => list_firewall_zones(api, site)
            .await
            .context("Failed to list firewall zones"),
    };

    if result.is_ok() && call.is_mutation() {
        info!(tool = call.name(), site, "Controller configuration changed");
    }
    result
}

// ============================================================================
// Fetch helpers
// ============================================================================

async fn fetch_devices(api: &dyn ControllerApi, site: &str) -> Result<Vec<Device>> {
    records(&api.get(&site_path(site, "stat/device")).await?)
}

async fn fetch_clients(
    api: &dyn ControllerApi,
    site: &str,
    active_only: bool,
) -> Result<Vec<ClientStation>> {
    let resource = if active_only { "stat/sta" } else { "rest/user" };
    records(&api.get(&site_path(site, resource)).await?)
}

async fn fetch_health(api: &dyn ControllerApi, site: &str) -> Result<Vec<HealthSubsystem>> {
    records(&api.get(&site_path(site, "stat/health")).await?)
}

/// The `data` rows of a write response, as returned by the controller
fn written(body: &JsonValue) -> JsonValue {
    body.get("data").cloned().unwrap_or(JsonValue::Null)
}

// ============================================================================
// Monitoring
// ============================================================================

pub(crate) async fn list_devices(
    api: &dyn ControllerApi,
    site: &str,
    args: &ListDevicesArgs,
) -> Result<JsonValue> {
    let mut devices = fetch_devices(api, site).await?;

    if let Some(kind) = &args.device_type {
        devices.retain(|d| d.device_type.as_deref() == Some(kind.as_str()));
    }
    if let Some(status) = &args.status {
        let want_online = status.eq_ignore_ascii_case("online");
        devices.retain(|d| d.is_online() == want_online);
    }

    let summaries: Vec<JsonValue> = devices.iter().map(summary::device_summary).collect();
    Ok(json!({
        "total_devices": summaries.len(),
        "devices": summaries,
        "site": site,
    }))
}

pub(crate) async fn list_clients(
    api: &dyn ControllerApi,
    site: &str,
    args: &ListClientsArgs,
) -> Result<JsonValue> {
    let clients = fetch_clients(api, site, args.active_only).await?;
    let summaries: Vec<JsonValue> = clients.iter().map(summary::client_summary).collect();
    Ok(json!({
        "total_clients": summaries.len(),
        "clients": summaries,
        "site": site,
        "active_only": args.active_only,
    }))
}

pub(crate) async fn get_system_info(api: &dyn ControllerApi, site: &str) -> Result<JsonValue> {
    let rows: Vec<SystemInfo> = records(&api.get(&site_path(site, "stat/sysinfo")).await?)?;
    let info = rows.into_iter().next().unwrap_or_default();
    Ok(json!({
        "system_info": summary::system_info_summary(&info),
        "site": site,
    }))
}

pub(crate) async fn get_health_status(api: &dyn ControllerApi, site: &str) -> Result<JsonValue> {
    let health = fetch_health(api, site).await?;
    Ok(json!({
        "health_status": health.iter().map(summary::health_summary).collect::<Vec<_>>(),
        "site": site,
        "overall_status": summary::overall_status(&health),
    }))
}

pub(crate) async fn get_device_health_summary(
    api: &dyn ControllerApi,
    site: &str,
) -> Result<JsonValue> {
    let (devices, health) = tokio::try_join!(fetch_devices(api, site), fetch_health(api, site))?;
    let mut payload = summary::device_health(&devices, &health);
    payload["site"] = json!(site);
    Ok(payload)
}

async fn get_isp_metrics(
    api: &dyn ControllerApi,
    site: &str,
    args: &IspMetricsArgs,
) -> Result<JsonValue> {
    let (health, devices) = tokio::try_join!(fetch_health(api, site), fetch_devices(api, site))?;
    Ok(json!({
        "isp_metrics": summary::isp_metrics(&devices, &health),
        "interval_hours": args.interval_hours,
        "site": site,
    }))
}

pub(crate) async fn analyze_network_performance(
    api: &dyn ControllerApi,
    site: &str,
) -> Result<JsonValue> {
    let (devices, clients, health) = tokio::try_join!(
        fetch_devices(api, site),
        fetch_clients(api, site, true),
        fetch_health(api, site)
    )?;
    Ok(json!({
        "network_analysis": summary::network_analysis(&devices, &clients, &health),
        "site": site,
    }))
}

async fn query_isp_metrics(
    api: &dyn ControllerApi,
    site: &str,
    args: &QueryMetricsArgs,
) -> Result<JsonValue> {
    let body = api.get(&site_path(site, args.metric_type.resource())).await?;
    let data = raw_records(&body);
    Ok(json!({
        "metric_type": args.metric_type,
        "time_range": args.time_range,
        "data_points": data.len(),
        "data": data,
        "site": site,
    }))
}

// ============================================================================
// Configuration listings
// ============================================================================

/// Pass-through listing: `{ total_<key>, <key>: [...], site }`
async fn list_resource(
    api: &dyn ControllerApi,
    site: &str,
    resource: &str,
    key: &str,
) -> Result<JsonValue> {
    let rows = raw_records(&api.get(&site_path(site, resource)).await?);
    let mut payload = JsonObject::new();
    payload.insert(format!("total_{key}"), json!(rows.len()));
    payload.insert(key.to_string(), JsonValue::Array(rows));
    payload.insert("site".to_string(), json!(site));
    Ok(JsonValue::Object(payload))
}

async fn get_firewall_rule(
    api: &dyn ControllerApi,
    site: &str,
    args: &GetFirewallRuleArgs,
) -> Result<JsonValue> {
    let path = site_path(site, &format!("rest/firewallrule/{}", args.rule_id));
    let rule = raw_records(&api.get(&path).await?).into_iter().next();
    Ok(json!({ "rule": rule, "site": site }))
}

async fn list_vpn_clients(
    api: &dyn ControllerApi,
    site: &str,
    args: &ListVpnClientsArgs,
) -> Result<JsonValue> {
    let mut clients: Vec<VpnClient> = records(&api.get(&site_path(site, "rest/vpnclient")).await?)?;
    if args.active_only {
        clients.retain(|c| c.enabled && c.connected);
    }

    Ok(json!({
        "total_vpn_clients": clients.len(),
        "active_clients": clients.iter().filter(|c| c.connected).count(),
        "clients": clients.iter().map(summary::vpn_client_summary).collect::<Vec<_>>(),
        "site": site,
    }))
}

async fn list_port_forwards(api: &dyn ControllerApi, site: &str) -> Result<JsonValue> {
    let rules: Vec<PortForward> = records(&api.get(&site_path(site, "rest/portforward")).await?)?;
    Ok(json!({
        "total_rules": rules.len(),
        "active_rules": rules.iter().filter(|r| r.enabled).count(),
        "rules": rules.iter().map(summary::port_forward_summary).collect::<Vec<_>>(),
        "site": site,
    }))
}

async fn list_firewall_zones(api: &dyn ControllerApi, site: &str) -> Result<JsonValue> {
    let zones: Vec<FirewallZone> = records(&api.get(&site_path(site, "rest/firewallzone")).await?)?;
    Ok(json!({
        "total_zones": zones.len(),
        "zones": zones.iter().map(summary::firewall_zone_summary).collect::<Vec<_>>(),
        "site": site,
    }))
}

// ============================================================================
// Configuration changes
// ============================================================================

async fn create_firewall_rule(
    api: &dyn ControllerApi,
    site: &str,
    args: &CreateFirewallRuleArgs,
) -> Result<JsonValue> {
    let mut body = json!({
        "name": args.name,
        "action": args.action,
        "protocol": args.protocol,
        "src_address": args.src_address,
        "dst_address": args.dst_address,
        "enabled": args.enabled,
    });
    if let Some(port) = args.dst_port.as_deref().filter(|p| !p.is_empty()) {
        body["dst_port"] = json!(port);
    }

    let response = api.post(&site_path(site, "rest/firewallrule"), &body).await?;
    Ok(json!({
        "success": true,
        "rule": written(&response),
        "site": site,
    }))
}

async fn create_qos_rule(
    api: &dyn ControllerApi,
    site: &str,
    args: &CreateQosRuleArgs,
) -> Result<JsonValue> {
    let body = json!({
        "name": args.name,
        "enabled": args.enabled,
        "download_limit_kbps": args.download_limit,
        "upload_limit_kbps": args.upload_limit,
        "target_type": args.target_type,
        "target_value": args.target_value,
    });

    let response = api.post(&site_path(site, "rest/qosrule"), &body).await?;
    Ok(json!({
        "success": true,
        "message": format!("QoS rule '{}' created", args.name),
        "rule": written(&response),
        "site": site,
    }))
}

/// PUT `{ enabled }` on `<resource>/<rule_id>`
async fn toggle(
    api: &dyn ControllerApi,
    site: &str,
    resource: &str,
    label: &str,
    args: &ToggleRuleArgs,
) -> Result<JsonValue> {
    let path = site_path(site, &format!("{resource}/{}", args.rule_id));
    let response = api.put(&path, &json!({ "enabled": args.enabled })).await?;
    Ok(json!({
        "success": true,
        "message": format!("{label} {}", enabled_word(args.enabled)),
        "rule": written(&response),
        "site": site,
    }))
}

async fn update_vpn_client_state(
    api: &dyn ControllerApi,
    site: &str,
    args: &VpnClientStateArgs,
) -> Result<JsonValue> {
    let path = site_path(site, &format!("rest/vpnclient/{}", args.client_id));
    let response = api.put(&path, &json!({ "enabled": args.enabled })).await?;
    Ok(json!({
        "success": true,
        "message": format!("VPN client {}", enabled_word(args.enabled)),
        "client": written(&response),
        "site": site,
    }))
}

async fn create_port_forward(
    api: &dyn ControllerApi,
    site: &str,
    args: &CreatePortForwardArgs,
) -> Result<JsonValue> {
    let body = json!({
        "name": args.name,
        "enabled": args.enabled,
        "src": "wan",
        "dst": "lan",
        "fwd_port": args.src_port,
        "fwd_ip": args.dst_ip,
        "fwd_port_to": args.dst_port,
        "proto": args.protocol,
        "log": args.log,
    });

    let response = api.post(&site_path(site, "rest/portforward"), &body).await?;
    Ok(json!({
        "success": true,
        "message": format!("Port forward '{}' created", args.name),
        "rule": written(&response),
        "site": site,
    }))
}

async fn create_traffic_route(
    api: &dyn ControllerApi,
    site: &str,
    args: &CreateTrafficRouteArgs,
) -> Result<JsonValue> {
    let mut body = json!({
        "name": args.name,
        "enabled": args.enabled,
        "static_route_network": args.destination_network,
        "static_route_nexthop": args.gateway_ip,
        "static_route_distance": args.metric,
    });
    if let Some(iface) = args.interface.as_deref().filter(|i| !i.is_empty()) {
        body["static_route_interface"] = json!(iface);
    }

    let response = api.post(&site_path(site, "rest/routing"), &body).await?;
    Ok(json!({
        "success": true,
        "message": format!("Traffic route '{}' created", args.name),
        "route": written(&response),
        "site": site,
    }))
}

async fn update_traffic_route(
    api: &dyn ControllerApi,
    site: &str,
    args: &UpdateTrafficRouteArgs,
) -> Result<JsonValue> {
    let mut body = JsonObject::new();
    if let Some(name) = &args.name {
        body.insert("name".to_string(), json!(name));
    }
    if let Some(enabled) = args.enabled {
        body.insert("enabled".to_string(), json!(enabled));
    }
    if let Some(network) = &args.destination_network {
        body.insert("static_route_network".to_string(), json!(network));
    }
    if let Some(gateway) = &args.gateway_ip {
        body.insert("static_route_nexthop".to_string(), json!(gateway));
    }
    if let Some(metric) = args.metric {
        body.insert("static_route_distance".to_string(), json!(metric));
    }

    let path = site_path(site, &format!("rest/routing/{}", args.route_id));
    let response = api.put(&path, &JsonValue::Object(body)).await?;
    Ok(json!({
        "success": true,
        "message": "Traffic route updated",
        "route": written(&response),
        "site": site,
    }))
}

async fn create_firewall_policy(
    api: &dyn ControllerApi,
    site: &str,
    args: &CreateFirewallPolicyArgs,
) -> Result<JsonValue> {
    let mut body = json!({
        "name": args.name,
        "enabled": args.enabled,
        "action": args.action,
        "protocol": args.protocol,
        "logging": args.logging,
    });
    let optional = [
        ("src_zone", &args.src_zone),
        ("dst_zone", &args.dst_zone),
        ("src_address_group", &args.src_address_group),
        ("dst_address_group", &args.dst_address_group),
        ("dst_port_group", &args.dst_port_group),
    ];
    for (field, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            body[field] = json!(value);
        }
    }

    let response = api.post(&site_path(site, "rest/firewallpolicy"), &body).await?;
    Ok(json!({
        "success": true,
        "message": format!("Firewall policy '{}' created", args.name),
        "policy": written(&response),
        "site": site,
    }))
}

fn enabled_word(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
