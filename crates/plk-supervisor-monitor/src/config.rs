// crates/plk-supervisor-monitor/src/config.rs
//! Runtime configuration, read once at start from the environment.

use plk_supervisor::NodeId;
use plk_supervisor::sdo::SdoTransport;
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_ADDR: &str = "PLK_MONITOR_ADDR";
pub const ENV_LOCAL_NODE_ID: &str = "PLK_LOCAL_NODE_ID";
pub const ENV_SYNC_PERIOD_MS: &str = "PLK_SYNC_PERIOD_MS";
pub const ENV_PROCESS_IMAGE: &str = "PLK_PROCESS_IMAGE";
pub const ENV_SDO_TRANSPORT: &str = "PLK_SDO_TRANSPORT";
pub const ENV_LOOPBACK_NODES: &str = "PLK_LOOPBACK_NODES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "Invalid value '{}' for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Address the HTTP/WebSocket API listens on.
    pub listen_addr: SocketAddr,
    /// Node id of this Managing Node.
    pub local_node_id: NodeId,
    /// DataSync cycle period.
    pub sync_period: Duration,
    /// JSON process image description. A built-in demo image is used if unset.
    pub process_image: Option<PathBuf>,
    /// Transport preselected in the SDO dialog.
    pub sdo_transport: SdoTransport,
    /// Remote nodes simulated by the loopback stack.
    pub loopback_nodes: Vec<NodeId>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            local_node_id: NodeId::LOCAL,
            sync_period: Duration::from_millis(100),
            process_image: None,
            sdo_transport: SdoTransport::ASnd,
            loopback_nodes: vec![NodeId(1), NodeId(2)],
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from defaults and whatever `lookup` returns
    /// for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ADDR) {
            config.listen_addr = parse(ENV_ADDR, &value)?;
        }
        if let Some(value) = lookup(ENV_LOCAL_NODE_ID) {
            // The supervisor is always the managing node.
            let raw: u8 = parse(ENV_LOCAL_NODE_ID, &value)?;
            match NodeId::try_from(raw) {
                Ok(node) if node.is_local() => config.local_node_id = node,
                _ => return Err(invalid(ENV_LOCAL_NODE_ID, &value)),
            }
        }
        if let Some(value) = lookup(ENV_SYNC_PERIOD_MS) {
            let ms: u64 = parse(ENV_SYNC_PERIOD_MS, &value)?;
            if ms == 0 {
                return Err(invalid(ENV_SYNC_PERIOD_MS, &value));
            }
            config.sync_period = Duration::from_millis(ms);
        }
        if let Some(value) = lookup(ENV_PROCESS_IMAGE) {
            if !value.trim().is_empty() {
                config.process_image = Some(PathBuf::from(value));
            }
        }
        if let Some(value) = lookup(ENV_SDO_TRANSPORT) {
            config.sdo_transport = match value.trim().to_ascii_lowercase().as_str() {
                "asnd" => SdoTransport::ASnd,
                "udp" => SdoTransport::Udp,
                _ => return Err(invalid(ENV_SDO_TRANSPORT, &value)),
            };
        }
        if let Some(value) = lookup(ENV_LOOPBACK_NODES) {
            config.loopback_nodes = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<u8>()
                        .ok()
                        .and_then(|raw| NodeId::try_from(raw).ok())
                        .ok_or_else(|| invalid(ENV_LOOPBACK_NODES, &value))
                })
                .collect::<Result<Vec<NodeId>, _>>()?;
            if config.loopback_nodes.contains(&config.local_node_id) {
                return Err(invalid(ENV_LOOPBACK_NODES, &value));
            }
        }
        Ok(config)
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:8080");
        assert!(config.local_node_id.is_local());
        assert_eq!(config.sync_period, Duration::from_millis(100));
    }

    #[test]
    fn test_overrides() {
        let config = MonitorConfig::from_lookup(lookup(&[
            (ENV_ADDR, "0.0.0.0:9000"),
            (ENV_SYNC_PERIOD_MS, "10"),
            (ENV_PROCESS_IMAGE, "/etc/plk/pi.json"),
            (ENV_SDO_TRANSPORT, "UDP"),
            (ENV_LOOPBACK_NODES, "3, 17,239"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.sync_period, Duration::from_millis(10));
        assert_eq!(config.process_image, Some(PathBuf::from("/etc/plk/pi.json")));
        assert_eq!(config.sdo_transport, SdoTransport::Udp);
        assert_eq!(config.loopback_nodes, [NodeId(3), NodeId(17), NodeId(239)]);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            (ENV_ADDR, "localhost"),
            (ENV_LOCAL_NODE_ID, "0"),
            (ENV_LOCAL_NODE_ID, "300"),
            (ENV_SYNC_PERIOD_MS, "0"),
            (ENV_SDO_TRANSPORT, "tcp"),
            (ENV_LOOPBACK_NODES, "1,241"),
            (ENV_LOCAL_NODE_ID, "1"),
            (ENV_LOCAL_NODE_ID, "239"),
        ] {
            assert_eq!(
                MonitorConfig::from_lookup(lookup(&[(key, value)])),
                Err(ConfigError::InvalidValue {
                    key,
                    value: value.to_string()
                }),
                "{}={}",
                key,
                value
            );
        }
    }

    #[test]
    fn test_loopback_nodes_must_not_include_the_local_node() {
        let vars = [(ENV_LOCAL_NODE_ID, "240"), (ENV_LOOPBACK_NODES, "1,240")];
        assert_eq!(
            MonitorConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidValue {
                key: ENV_LOOPBACK_NODES,
                value: "1,240".to_string()
            })
        );

        let config = MonitorConfig::from_lookup(lookup(&[(ENV_LOCAL_NODE_ID, "240")])).unwrap();
        assert_eq!(config.local_node_id, NodeId::LOCAL);
        assert!(!config.loopback_nodes.contains(&NodeId::LOCAL));
    }
}
