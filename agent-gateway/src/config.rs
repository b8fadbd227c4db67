use std::time::Duration;

/// Tunable parameters for a [`crate::Gateway`] connection.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Maximum number of undelivered inbound messages buffered before the
    /// overflow policy starts evicting the oldest ones.
    pub inbox_capacity: usize,
    /// How long to wait for a reply to a control operation (subscribe,
    /// agent/service discovery) before giving up.
    pub control_timeout: Duration,
    /// Chunk size used when growing the read buffer while framing incoming
    /// lines.
    pub read_chunk_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: 256,
            control_timeout: Duration::from_secs(5),
            read_chunk_size: 4096,
        }
    }
}
