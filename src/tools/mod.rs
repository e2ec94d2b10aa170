//! MCP tool layer
//!
//! Declares the tools advertised to MCP clients, decodes and validates their
//! arguments, and runs them against a [`ControllerApi`](crate::http::ControllerApi).
//!
//! # Tool families
//!
//! - **Monitoring**: devices, clients, system info, health, ISP metrics
//! - **Firewall & networks**: rules, groups, WLANs, network configs, zone policies
//! - **QoS / VPN / port forwarding / static routes**: list, create, toggle

mod args;
mod definitions;
mod handlers;
pub mod summary;

pub use args::{
    CreateFirewallPolicyArgs, CreateFirewallRuleArgs, CreatePortForwardArgs, CreateQosRuleArgs,
    CreateTrafficRouteArgs, GetFirewallRuleArgs, IspMetricsArgs, ListClientsArgs,
    ListDevicesArgs, ListVpnClientsArgs, MetricType, QueryMetricsArgs, SiteIdArgs, SiteNameArgs,
    ToggleRuleArgs, ToolArgs, ToolCall, UpdateTrafficRouteArgs, VpnClientStateArgs,
};
pub use definitions::{find_tool, tool_definitions, ToolDefinition};
pub use handlers::execute;

pub(crate) use handlers::{
    analyze_network_performance, get_device_health_summary, get_health_status, get_system_info,
    list_clients, list_devices,
};
