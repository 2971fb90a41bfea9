//! Hub configuration.

use hubkit_port::PortSetupConfig;
use hubkit_queue::QueueConfig;

/// Configuration for one hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub id byte carried in every frame
    pub hub_id: u8,
    /// Transmission queue configuration
    pub queue: QueueConfig,
    /// Bring-up detail query configuration
    pub port_setup: PortSetupConfig,
    /// Virtual port id the firmware never tears down across reconnects and
    /// does not re-announce. `startup()` proactively disconnects it, ignoring
    /// any error. `None` disables the workaround.
    pub persistent_virtual_port: Option<u8>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            hub_id: 0,
            queue: QueueConfig::default(),
            port_setup: PortSetupConfig::default(),
            persistent_virtual_port: Some(0x10),
        }
    }
}
