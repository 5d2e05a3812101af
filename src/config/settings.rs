//! Configuration structures for TcpFrame

use crate::trace::Severity;
use crate::{Result, ServerError};
use serde::{Deserialize, Serialize};

/// Server configuration
///
/// Immutable after construction; owned by the [`TcpServer`] that is built
/// from it.
///
/// [`TcpServer`]: crate::server::TcpServer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port the service listener binds to
    pub service_port: u16,
    /// TCP port the shutdown listener binds to; any connection to it stops
    /// the server
    pub control_port: u16,
    /// Server name, used only in trace text
    pub name: String,
    /// Source-level severity switch; events below it are dropped before any
    /// sink sees them
    pub min_severity: Severity,
}

impl ServerConfig {
    /// Create a configuration with the given ports and name, tracing at
    /// `Info` and above
    pub fn new(service_port: u16, control_port: u16, name: &str) -> Self {
        Self {
            service_port,
            control_port,
            name: name.to_string(),
            min_severity: Severity::Info,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.service_port == 0 {
            return Err(ServerError::Config(
                "Service port cannot be 0".to_string(),
            ));
        }
        if self.control_port == 0 {
            return Err(ServerError::Config(
                "Control port cannot be 0".to_string(),
            ));
        }
        if self.service_port == self.control_port {
            return Err(ServerError::Config(format!(
                "Service and control port must differ (both are {})",
                self.service_port
            )));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(9000, 9001, "tcpframe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_severity, Severity::Info);
    }

    #[test]
    fn test_zero_ports_rejected() {
        let mut config = ServerConfig::default();
        config.service_port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.control_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_equal_ports_rejected() {
        let config = ServerConfig::new(9000, 9000, "dup");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }
}
