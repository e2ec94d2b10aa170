//! Tool declarations advertised through `tools/list`

use serde_json::{json, Value};

/// One advertised tool
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn site_name_property() -> Value {
    json!({ "type": "string", "description": "Site name", "default": "default" })
}

fn site_id_property() -> Value {
    json!({ "type": "string", "description": "Site ID", "default": "default" })
}

fn site_name_only() -> Value {
    json!({
        "type": "object",
        "properties": { "site_name": site_name_property() }
    })
}

fn site_id_only() -> Value {
    json!({
        "type": "object",
        "properties": { "site_id": site_id_property() }
    })
}

fn toggle_schema(id_field: &str, id_description: &str, enabled_description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            id_field: { "type": "string", "description": id_description },
            "enabled": { "type": "boolean", "description": enabled_description },
            "site_id": site_id_property()
        },
        "required": [id_field, "enabled"]
    })
}

/// All tools, in the order they are listed
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // Monitoring
        ToolDefinition {
            name: "list_devices",
            description: "List all UniFi devices of the site",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "site_name": site_name_property(),
                    "device_type": {
                        "type": "string",
                        "description": "Device type to filter by (uap, usw, ugw, ...)"
                    },
                    "status": {
                        "type": "string",
                        "description": "Status to filter by (online, offline)"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "list_clients",
            description: "List the clients connected to the site",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "site_name": site_name_property(),
                    "active_only": {
                        "type": "boolean",
                        "description": "Only show active clients",
                        "default": true
                    }
                }
            }),
        },
        ToolDefinition {
            name: "get_system_info",
            description: "Get controller system information",
            input_schema: site_name_only(),
        },
        ToolDefinition {
            name: "get_health_status",
            description: "Get the health status of the site",
            input_schema: site_name_only(),
        },
        ToolDefinition {
            name: "get_device_health_summary",
            description: "Summarize the health of all devices",
            input_schema: site_name_only(),
        },
        ToolDefinition {
            name: "get_isp_metrics",
            description: "Get basic site metrics for connectivity analysis",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "site_name": site_name_property(),
                    "interval_hours": {
                        "type": "integer",
                        "description": "Hours of history to consider",
                        "default": 1
                    }
                }
            }),
        },
        ToolDefinition {
            name: "analyze_network_performance",
            description: "Analyze network performance and suggest improvements",
            input_schema: site_name_only(),
        },
        ToolDefinition {
            name: "query_isp_metrics",
            description: "Query one family of site statistics",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "site_name": site_name_property(),
                    "metric_type": {
                        "type": "string",
                        "description": "Metric type",
                        "enum": ["device_stats", "client_stats", "health_stats"],
                        "default": "device_stats"
                    },
                    "time_range": {
                        "type": "string",
                        "description": "Time range",
                        "default": "1h"
                    }
                }
            }),
        },
        // Firewall and network configuration
        ToolDefinition {
            name: "list_firewall_rules",
            description: "List the firewall rules of the site",
            input_schema: site_id_only(),
        },
        ToolDefinition {
            name: "get_firewall_rule",
            description: "Get one firewall rule",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "rule_id": { "type": "string", "description": "Firewall rule ID" },
                    "site_id": site_id_property()
                },
                "required": ["rule_id"]
            }),
        },
        ToolDefinition {
            name: "list_firewall_groups",
            description: "List the firewall groups of the site",
            input_schema: site_id_only(),
        },
        ToolDefinition {
            name: "create_firewall_rule",
            description: "Create a firewall rule",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Rule name" },
                    "action": { "type": "string", "description": "Action (accept, drop, reject)" },
                    "protocol": { "type": "string", "description": "Protocol (tcp, udp, icmp, all)" },
                    "src_address": { "type": "string", "description": "Source address" },
                    "dst_address": { "type": "string", "description": "Destination address" },
                    "dst_port": { "type": "string", "description": "Destination port (optional)" },
                    "enabled": {
                        "type": "boolean",
                        "description": "Whether the rule is enabled",
                        "default": true
                    },
                    "site_id": site_id_property()
                },
                "required": ["name", "action", "protocol", "src_address", "dst_address"]
            }),
        },
        ToolDefinition {
            name: "list_wlan_configs",
            description: "List the WLAN configurations",
            input_schema: site_id_only(),
        },
        ToolDefinition {
            name: "list_network_configs",
            description: "List the network configurations (VLANs, ...)",
            input_schema: site_id_only(),
        },
        // QoS
        ToolDefinition {
            name: "unifi_create_qos_rule",
            description: "Create a QoS rule to limit bandwidth",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "QoS rule name" },
                    "enabled": {
                        "type": "boolean",
                        "description": "Whether the rule is enabled",
                        "default": true
                    },
                    "download_limit": { "type": "number", "description": "Download limit in Kbps" },
                    "upload_limit": { "type": "number", "description": "Upload limit in Kbps" },
                    "target_type": {
                        "type": "string",
                        "description": "Target type (client, network, device)",
                        "default": "client"
                    },
                    "target_value": { "type": "string", "description": "Target value (MAC, IP, CIDR)" },
                    "site_id": site_id_property()
                },
                "required": ["name", "download_limit", "upload_limit", "target_value"]
            }),
        },
        ToolDefinition {
            name: "unifi_toggle_qos_rule_enabled",
            description: "Enable or disable an existing QoS rule",
            input_schema: toggle_schema("rule_id", "QoS rule ID", "Desired rule state"),
        },
        // VPN
        ToolDefinition {
            name: "unifi_list_vpn_clients",
            description: "List the configured VPN clients",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "site_id": site_id_property(),
                    "active_only": {
                        "type": "boolean",
                        "description": "Only show connected VPN clients",
                        "default": false
                    }
                }
            }),
        },
        ToolDefinition {
            name: "unifi_update_vpn_client_state",
            description: "Enable or disable a VPN client",
            input_schema: toggle_schema("client_id", "VPN client ID", "Desired client state"),
        },
        // Port forwarding
        ToolDefinition {
            name: "unifi_list_port_forwards",
            description: "List the port forwarding rules",
            input_schema: site_id_only(),
        },
        ToolDefinition {
            name: "unifi_create_port_forward",
            description: "Create a port forwarding rule",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Port forward name" },
                    "enabled": {
                        "type": "boolean",
                        "description": "Whether the rule is enabled",
                        "default": true
                    },
                    "src_port": { "type": "string", "description": "External port" },
                    "dst_port": { "type": "string", "description": "Internal port" },
                    "dst_ip": { "type": "string", "description": "Internal destination IP" },
                    "protocol": {
                        "type": "string",
                        "description": "Protocol (tcp, udp, tcp_udp)",
                        "default": "tcp"
                    },
                    "log": { "type": "boolean", "description": "Enable logging", "default": false },
                    "site_id": site_id_property()
                },
                "required": ["name", "src_port", "dst_port", "dst_ip"]
            }),
        },
        ToolDefinition {
            name: "unifi_toggle_port_forward",
            description: "Enable or disable a port forwarding rule",
            input_schema: toggle_schema("rule_id", "Port forward rule ID", "Desired rule state"),
        },
        // Static routes
        ToolDefinition {
            name: "unifi_create_traffic_route",
            description: "Create a static traffic route",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Route name" },
                    "enabled": {
                        "type": "boolean",
                        "description": "Whether the route is enabled",
                        "default": true
                    },
                    "destination_network": { "type": "string", "description": "Destination network (CIDR)" },
                    "gateway_ip": { "type": "string", "description": "Next-hop gateway IP" },
                    "interface": { "type": "string", "description": "Network interface (optional)" },
                    "metric": { "type": "number", "description": "Route metric", "default": 1 },
                    "site_id": site_id_property()
                },
                "required": ["name", "destination_network", "gateway_ip"]
            }),
        },
        ToolDefinition {
            name: "unifi_update_traffic_route",
            description: "Update an existing traffic route",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "route_id": { "type": "string", "description": "Route ID" },
                    "name": { "type": "string", "description": "New route name" },
                    "enabled": { "type": "boolean", "description": "Route state" },
                    "destination_network": { "type": "string", "description": "New destination network (CIDR)" },
                    "gateway_ip": { "type": "string", "description": "New gateway IP" },
                    "metric": { "type": "number", "description": "New route metric" },
                    "site_id": site_id_property()
                },
                "required": ["route_id"]
            }),
        },
        // Zone-based firewall
        ToolDefinition {
            name: "unifi_create_firewall_policy",
            description: "Create a zone-based firewall policy",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Policy name" },
                    "enabled": {
                        "type": "boolean",
                        "description": "Whether the policy is enabled",
                        "default": true
                    },
                    "action": {
                        "type": "string",
                        "description": "Action (accept, drop, reject)",
                        "default": "accept"
                    },
                    "protocol": {
                        "type": "string",
                        "description": "Protocol (tcp, udp, icmp, all)",
                        "default": "all"
                    },
                    "src_zone": { "type": "string", "description": "Source zone" },
                    "dst_zone": { "type": "string", "description": "Destination zone" },
                    "src_address_group": { "type": "string", "description": "Source address group" },
                    "dst_address_group": { "type": "string", "description": "Destination address group" },
                    "dst_port_group": { "type": "string", "description": "Destination port group" },
                    "logging": { "type": "boolean", "description": "Enable logging", "default": false },
                    "site_id": site_id_property()
                },
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: "unifi_list_firewall_zones",
            description: "List the configured firewall zones",
            input_schema: site_id_only(),
        },
    ]
}

/// Look up one declaration by name
pub fn find_tool(name: &str) -> Option<ToolDefinition> {
    tool_definitions().into_iter().find(|tool| tool.name == name)
}
