//! Typed tool arguments
//!
//! Raw `arguments` objects from `tools/call` are decoded into one record per
//! tool, defaults applied by serde, then validated before anything is sent to
//! the controller.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Characters that would change the meaning of a URL path segment
const FORBIDDEN_SEGMENT_CHARS: [char; 3] = ['/', '?', '#'];

// ============================================================================
// Validation helpers
// ============================================================================

/// Argument records validate themselves after decoding
pub trait ToolArgs: DeserializeOwned {
    /// Check invariants serde cannot express
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

fn required(field: &str, value: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("'{field}' must not be empty"));
    }
    Ok(())
}

fn segment(field: &str, value: &str) -> std::result::Result<(), String> {
    required(field, value)?;
    if value.contains(FORBIDDEN_SEGMENT_CHARS) {
        return Err(format!("'{field}' must not contain '/', '?' or '#'"));
    }
    Ok(())
}

fn optional_segment(field: &str, value: Option<&String>) -> std::result::Result<(), String> {
    match value {
        Some(v) => segment(field, v),
        None => Ok(()),
    }
}

fn positive(field: &str, value: f64) -> std::result::Result<(), String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("'{field}' must be a positive number"));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

/// Ports arrive as strings or numbers depending on the MCP client
fn port_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Text(String),
        Number(u64),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Text(s) => s,
        Port::Number(n) => n.to_string(),
    })
}

fn optional_port_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "port_string")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(s)| s))
}

// ============================================================================
// Monitoring tools (site given as `site_name`)
// ============================================================================

/// Arguments carrying only a site name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteNameArgs {
    pub site_name: Option<String>,
}

impl ToolArgs for SiteNameArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        optional_segment("site_name", self.site_name.as_ref())
    }
}

/// `list_devices`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDevicesArgs {
    pub site_name: Option<String>,
    /// Device type code, e.g. `uap`, `usw`, `ugw`
    pub device_type: Option<String>,
    /// `online` keeps connected devices, anything else keeps the rest
    pub status: Option<String>,
}

impl ToolArgs for ListDevicesArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        optional_segment("site_name", self.site_name.as_ref())
    }
}

/// `list_clients`
#[derive(Debug, Clone, Deserialize)]
pub struct ListClientsArgs {
    pub site_name: Option<String>,
    #[serde(default = "default_true")]
    pub active_only: bool,
}

impl ToolArgs for ListClientsArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        optional_segment("site_name", self.site_name.as_ref())
    }
}

/// `get_isp_metrics`
#[derive(Debug, Clone, Deserialize)]
pub struct IspMetricsArgs {
    pub site_name: Option<String>,
    #[serde(default = "IspMetricsArgs::default_interval")]
    pub interval_hours: u32,
}

impl IspMetricsArgs {
    fn default_interval() -> u32 {
        1
    }
}

impl ToolArgs for IspMetricsArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        optional_segment("site_name", self.site_name.as_ref())
    }
}

/// Statistics family read by `query_isp_metrics`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    #[default]
    DeviceStats,
    ClientStats,
    HealthStats,
}

impl MetricType {
    /// Site-relative statistics resource
    pub fn resource(self) -> &'static str {
        match self {
            MetricType::DeviceStats => "stat/device",
            MetricType::ClientStats => "stat/sta",
            MetricType::HealthStats => "stat/health",
        }
    }
}

/// `query_isp_metrics`
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMetricsArgs {
    pub site_name: Option<String>,
    #[serde(default)]
    pub metric_type: MetricType,
    #[serde(default = "QueryMetricsArgs::default_time_range")]
    pub time_range: String,
}

impl QueryMetricsArgs {
    fn default_time_range() -> String {
        "1h".to_string()
    }
}

impl ToolArgs for QueryMetricsArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        optional_segment("site_name", self.site_name.as_ref())
    }
}

// ============================================================================
// Configuration tools (site given as `site_id`)
// ============================================================================

/// Arguments carrying only a site id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteIdArgs {
    pub site_id: Option<String>,
}

impl ToolArgs for SiteIdArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `get_firewall_rule`
#[derive(Debug, Clone, Deserialize)]
pub struct GetFirewallRuleArgs {
    pub rule_id: String,
    pub site_id: Option<String>,
}

impl ToolArgs for GetFirewallRuleArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        segment("rule_id", &self.rule_id)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `create_firewall_rule`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFirewallRuleArgs {
    pub name: String,
    /// `accept`, `drop` or `reject`
    pub action: String,
    /// `tcp`, `udp`, `icmp` or `all`
    pub protocol: String,
    pub src_address: String,
    pub dst_address: String,
    #[serde(default, deserialize_with = "optional_port_string")]
    pub dst_port: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub site_id: Option<String>,
}

impl ToolArgs for CreateFirewallRuleArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        required("name", &self.name)?;
        required("action", &self.action)?;
        required("protocol", &self.protocol)?;
        required("src_address", &self.src_address)?;
        required("dst_address", &self.dst_address)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `unifi_create_qos_rule`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQosRuleArgs {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Kbps
    pub download_limit: f64,
    /// Kbps
    pub upload_limit: f64,
    #[serde(default = "CreateQosRuleArgs::default_target_type")]
    pub target_type: String,
    /// MAC, IP or CIDR depending on `target_type`
    pub target_value: String,
    pub site_id: Option<String>,
}

impl CreateQosRuleArgs {
    fn default_target_type() -> String {
        "client".to_string()
    }
}

impl ToolArgs for CreateQosRuleArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        required("name", &self.name)?;
        positive("download_limit", self.download_limit)?;
        positive("upload_limit", self.upload_limit)?;
        required("target_value", &self.target_value)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// Enable or disable a rule by id (QoS rules, port forwards)
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRuleArgs {
    pub rule_id: String,
    pub enabled: bool,
    pub site_id: Option<String>,
}

impl ToolArgs for ToggleRuleArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        segment("rule_id", &self.rule_id)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `unifi_list_vpn_clients`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListVpnClientsArgs {
    pub site_id: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

impl ToolArgs for ListVpnClientsArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `unifi_update_vpn_client_state`
#[derive(Debug, Clone, Deserialize)]
pub struct VpnClientStateArgs {
    pub client_id: String,
    pub enabled: bool,
    pub site_id: Option<String>,
}

impl ToolArgs for VpnClientStateArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        segment("client_id", &self.client_id)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `unifi_create_port_forward`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePortForwardArgs {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// External port
    #[serde(deserialize_with = "port_string")]
    pub src_port: String,
    /// Internal port
    #[serde(deserialize_with = "port_string")]
    pub dst_port: String,
    pub dst_ip: String,
    #[serde(default = "CreatePortForwardArgs::default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub log: bool,
    pub site_id: Option<String>,
}

impl CreatePortForwardArgs {
    fn default_protocol() -> String {
        "tcp".to_string()
    }
}

impl ToolArgs for CreatePortForwardArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        required("name", &self.name)?;
        required("src_port", &self.src_port)?;
        required("dst_port", &self.dst_port)?;
        required("dst_ip", &self.dst_ip)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `unifi_create_traffic_route`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrafficRouteArgs {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// CIDR
    pub destination_network: String,
    pub gateway_ip: String,
    pub interface: Option<String>,
    #[serde(default = "CreateTrafficRouteArgs::default_metric")]
    pub metric: u32,
    pub site_id: Option<String>,
}

impl CreateTrafficRouteArgs {
    fn default_metric() -> u32 {
        1
    }
}

impl ToolArgs for CreateTrafficRouteArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        required("name", &self.name)?;
        required("destination_network", &self.destination_network)?;
        required("gateway_ip", &self.gateway_ip)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `unifi_update_traffic_route`; only the fields given are changed
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTrafficRouteArgs {
    pub route_id: String,
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub destination_network: Option<String>,
    pub gateway_ip: Option<String>,
    pub metric: Option<u32>,
    pub site_id: Option<String>,
}

impl ToolArgs for UpdateTrafficRouteArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        segment("route_id", &self.route_id)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

/// `unifi_create_firewall_policy`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFirewallPolicyArgs {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "CreateFirewallPolicyArgs::default_action")]
    pub action: String,
    #[serde(default = "CreateFirewallPolicyArgs::default_protocol")]
    pub protocol: String,
    pub src_zone: Option<String>,
    pub dst_zone: Option<String>,
    pub src_address_group: Option<String>,
    pub dst_address_group: Option<String>,
    pub dst_port_group: Option<String>,
    #[serde(default)]
    pub logging: bool,
    pub site_id: Option<String>,
}

impl CreateFirewallPolicyArgs {
    fn default_action() -> String {
        "accept".to_string()
    }

    fn default_protocol() -> String {
        "all".to_string()
    }
}

impl ToolArgs for CreateFirewallPolicyArgs {
    fn validate(&self) -> std::result::Result<(), String> {
        required("name", &self.name)?;
        required("action", &self.action)?;
        optional_segment("site_id", self.site_id.as_ref())
    }
}

// ============================================================================
// Tool call
// ============================================================================

/// A parsed, validated tool invocation
#[derive(Debug, Clone)]
pub enum ToolCall {
    ListDevices(ListDevicesArgs),
    ListClients(ListClientsArgs),
    GetSystemInfo(SiteNameArgs),
    GetHealthStatus(SiteNameArgs),
    GetDeviceHealthSummary(SiteNameArgs),
    GetIspMetrics(IspMetricsArgs),
    AnalyzeNetworkPerformance(SiteNameArgs),
    QueryIspMetrics(QueryMetricsArgs),
    ListFirewallRules(SiteIdArgs),
    GetFirewallRule(GetFirewallRuleArgs),
    ListFirewallGroups(SiteIdArgs),
    CreateFirewallRule(CreateFirewallRuleArgs),
    ListWlanConfigs(SiteIdArgs),
    ListNetworkConfigs(SiteIdArgs),
    CreateQosRule(CreateQosRuleArgs),
    ToggleQosRule(ToggleRuleArgs),
    ListVpnClients(ListVpnClientsArgs),
    UpdateVpnClientState(VpnClientStateArgs),
    ListPortForwards(SiteIdArgs),
    CreatePortForward(CreatePortForwardArgs),
    TogglePortForward(ToggleRuleArgs),
    CreateTrafficRoute(CreateTrafficRouteArgs),
    UpdateTrafficRoute(UpdateTrafficRouteArgs),
    CreateFirewallPolicy(CreateFirewallPolicyArgs),
    ListFirewallZones(SiteIdArgs),
}

impl ToolCall {
    /// Decode and validate `arguments` for the named tool.
    ///
    /// A missing or null `arguments` is treated as an empty object.
    pub fn parse(name: &str, arguments: JsonValue) -> Result<Self> {
        let arguments = match arguments {
            JsonValue::Null => JsonValue::Object(Default::default()),
            JsonValue::Object(map) => JsonValue::Object(map),
            _ => return Err(Error::invalid_argument(name, "arguments must be an object")),
        };

        let call = match name {
            "list_devices" => Self::ListDevices(decode(name, arguments)?),
            "list_clients" => Self::ListClients(decode(name, arguments)?),
            "get_system_info" => Self::GetSystemInfo(decode(name, arguments)?),
            "get_health_status" => Self::GetHealthStatus(decode(name, arguments)?),
            "get_device_health_summary" => Self::GetDeviceHealthSummary(decode(name, arguments)?),
            "get_isp_metrics" => Self::GetIspMetrics(decode(name, arguments)?),
            "analyze_network_performance" => {
                Self::AnalyzeNetworkPerformance(decode(name, arguments)?)
            }
            "query_isp_metrics" => Self::QueryIspMetrics(decode(name, arguments)?),
            "list_firewall_rules" => Self::ListFirewallRules(decode(name, arguments)?),
            "get_firewall_rule" => Self::GetFirewallRule(decode(name, arguments)?),
            "list_firewall_groups" => Self::ListFirewallGroups(decode(name, arguments)?),
            "create_firewall_rule" => Self::CreateFirewallRule(decode(name, arguments)?),
            "list_wlan_configs" => Self::ListWlanConfigs(decode(name, arguments)?),
            "list_network_configs" => Self::ListNetworkConfigs(decode(name, arguments)?),
            "unifi_create_qos_rule" => Self::CreateQosRule(decode(name, arguments)?),
            "unifi_toggle_qos_rule_enabled" => Self::ToggleQosRule(decode(name, arguments)?),
            "unifi_list_vpn_clients" => Self::ListVpnClients(decode(name, arguments)?),
            "unifi_update_vpn_client_state" => {
                Self::UpdateVpnClientState(decode(name, arguments)?)
            }
            "unifi_list_port_forwards" => Self::ListPortForwards(decode(name, arguments)?),
            "unifi_create_port_forward" => Self::CreatePortForward(decode(name, arguments)?),
            "unifi_toggle_port_forward" => Self::TogglePortForward(decode(name, arguments)?),
            "unifi_create_traffic_route" => Self::CreateTrafficRoute(decode(name, arguments)?),
            "unifi_update_traffic_route" => Self::UpdateTrafficRoute(decode(name, arguments)?),
            "unifi_create_firewall_policy" => {
                Self::CreateFirewallPolicy(decode(name, arguments)?)
            }
            "unifi_list_firewall_zones" => Self::ListFirewallZones(decode(name, arguments)?),
            _ => return Err(Error::unknown_tool(name)),
        };
        Ok(call)
    }

    /// Wire name of the tool
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListDevices(_) => "list_devices",
            Self::ListClients(_) => "list_clients",
            Self::GetSystemInfo(_) => "get_system_info",
            Self::GetHealthStatus(_) => "get_health_status",
            Self::GetDeviceHealthSummary(_) => "get_device_health_summary",
            Self::GetIspMetrics(_) => "get_isp_metrics",
            Self::AnalyzeNetworkPerformance(_) => "analyze_network_performance",
            Self::QueryIspMetrics(_) => "query_isp_metrics",
            Self::ListFirewallRules(_) => "list_firewall_rules",
            Self::GetFirewallRule(_) => "get_firewall_rule",
            Self::ListFirewallGroups(_) => "list_firewall_groups",
            Self::CreateFirewallRule(_) => "create_firewall_rule",
            Self::ListWlanConfigs(_) => "list_wlan_configs",
            Self::ListNetworkConfigs(_) => "list_network_configs",
            Self::CreateQosRule(_) => "unifi_create_qos_rule",
            Self::ToggleQosRule(_) => "unifi_toggle_qos_rule_enabled",
            Self::ListVpnClients(_) => "unifi_list_vpn_clients",
            Self::UpdateVpnClientState(_) => "unifi_update_vpn_client_state",
            Self::ListPortForwards(_) => "unifi_list_port_forwards",
            Self::CreatePortForward(_) => "unifi_create_port_forward",
            Self::TogglePortForward(_) => "unifi_toggle_port_forward",
            Self::CreateTrafficRoute(_) => "unifi_create_traffic_route",
            Self::UpdateTrafficRoute(_) => "unifi_update_traffic_route",
            Self::CreateFirewallPolicy(_) => "unifi_create_firewall_policy",
            Self::ListFirewallZones(_) => "unifi_list_firewall_zones",
        }
    }

    /// Site named by the caller, if any
    pub fn site(&self) -> Option<&str> {
        let site = match self {
            Self::ListDevices(a) => &a.site_name,
            Self::ListClients(a) => &a.site_name,
            Self::GetSystemInfo(a)
            | Self::GetHealthStatus(a)
            | Self::GetDeviceHealthSummary(a)
            | Self::AnalyzeNetworkPerformance(a) => &a.site_name,
            Self::GetIspMetrics(a) => &a.site_name,
            Self::QueryIspMetrics(a) => &a.site_name,
            Self::ListFirewallRules(a)
            | Self::ListFirewallGroups(a)
            | Self::ListWlanConfigs(a)
            | Self::ListNetworkConfigs(a)
            | Self::ListPortForwards(a)
            | Self::ListFirewallZones(a) => &a.site_id,
            Self::GetFirewallRule(a) => &a.site_id,
            Self::CreateFirewallRule(a) => &a.site_id,
            Self::CreateQosRule(a) => &a.site_id,
            Self::ToggleQosRule(a) | Self::TogglePortForward(a) => &a.site_id,
            Self::ListVpnClients(a) => &a.site_id,
            Self::UpdateVpnClientState(a) => &a.site_id,
            Self::CreatePortForward(a) => &a.site_id,
            Self::CreateTrafficRoute(a) => &a.site_id,
            Self::UpdateTrafficRoute(a) => &a.site_id,
            Self::CreateFirewallPolicy(a) => &a.site_id,
        };
        site.as_deref()
    }

    /// True for tools that change controller configuration
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateFirewallRule(_)
                | Self::CreateQosRule(_)
                | Self::ToggleQosRule(_)
                | Self::UpdateVpnClientState(_)
                | Self::CreatePortForward(_)
                | Self::TogglePortForward(_)
                | Self::CreateTrafficRoute(_)
                | Self::UpdateTrafficRoute(_)
                | Self::CreateFirewallPolicy(_)
        )
    }
}

fn decode<T: ToolArgs>(tool: &str, arguments: JsonValue) -> Result<T> {
    let args: T =
        serde_json::from_value(arguments).map_err(|e| Error::invalid_argument(tool, e.to_string()))?;
    args.validate()
        .map_err(|message| Error::invalid_argument(tool, message))?;
    Ok(args)
}
