//! `unifi://` resources: read-only snapshots built from the monitoring tools

use crate::error::Result;
use crate::http::ControllerApi;
use crate::tools::{self, ListClientsArgs, ListDevicesArgs};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

/// Readable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Devices,
    Clients,
    Health,
    Statistics,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Devices,
        Resource::Clients,
        Resource::Health,
        Resource::Statistics,
    ];

    pub fn uri(self) -> &'static str {
        match self {
            Resource::Devices => "unifi://devices",
            Resource::Clients => "unifi://clients",
            Resource::Health => "unifi://health",
            Resource::Statistics => "unifi://statistics",
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.uri() == uri)
    }

    fn name(self) -> &'static str {
        match self {
            Resource::Devices => "Devices",
            Resource::Clients => "Clients",
            Resource::Health => "Health",
            Resource::Statistics => "Statistics",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Resource::Devices => "UniFi devices of the default site",
            Resource::Clients => "Active clients of the default site",
            Resource::Health => "Subsystem health of the default site",
            Resource::Statistics => "System information and device health summary",
        }
    }

    /// Entry for `resources/list`
    pub fn descriptor(self) -> Value {
        json!({
            "uri": self.uri(),
            "name": self.name(),
            "description": self.description(),
            "mimeType": "application/json"
        })
    }

    /// Fetch the resource's current content
    pub async fn read(self, api: &dyn ControllerApi, site: &str, now: DateTime<Utc>) -> Result<Value> {
        match self {
            Resource::Devices => tools::list_devices(api, site, &ListDevicesArgs::default()).await,
            Resource::Clients => {
                let args = ListClientsArgs {
                    site_name: None,
                    active_only: true,
                };
                tools::list_clients(api, site, &args).await
            }
            Resource::Health => tools::get_health_status(api, site).await,
            Resource::Statistics => {
                let (system_info, device_health) = tokio::try_join!(
                    tools::get_system_info(api, site),
                    tools::get_device_health_summary(api, site)
                )?;
                Ok(json!({
                    "system_info": system_info,
                    "device_health": device_health,
                    "timestamp": now.to_rfc3339_opts(SecondsFormat::Millis, true),
                }))
            }
        }
    }
}

/// Payload of `resources/list`
pub fn resources_list_payload() -> Value {
    let resources: Vec<Value> = Resource::ALL.into_iter().map(Resource::descriptor).collect();
    json!({ "resources": resources })
}
