use pong_shared::config::ArenaConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_rate_hz: u32,
    /// Seed for participant id generation
    pub id_seed: u64,
    /// Capacity of the connection -> game loop command channel
    pub command_buffer: usize,
    /// Capacity of the game loop -> connections broadcast channel
    pub broadcast_buffer: usize,
    pub arena: ArenaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".to_string(),
            tick_rate_hz: 60,
            id_seed: 42,
            command_buffer: 256,
            broadcast_buffer: 64,
            arena: ArenaConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, with `PONG_LISTEN_ADDR` and `PONG_TICK_RATE_HZ` applied when set.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("PONG_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Ok(rate) = std::env::var("PONG_TICK_RATE_HZ") {
            config.tick_rate_hz = rate
                .parse()
                .map_err(|e| format!("PONG_TICK_RATE_HZ={:?} is not a valid rate: {}", rate, e))?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err("tick_rate_hz must be in 1..=1000".to_string());
        }
        if self.command_buffer == 0 {
            return Err("command_buffer must be > 0".to_string());
        }
        if self.broadcast_buffer == 0 {
            return Err("broadcast_buffer must be > 0".to_string());
        }
        self.arena.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_rate_hz, 60);
        assert!(config.listen_addr.ends_with(":3001"));
    }

    #[test]
    fn zero_tick_rate_invalid() {
        let config = ServerConfig {
            tick_rate_hz: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_broadcast_buffer_invalid() {
        let config = ServerConfig {
            broadcast_buffer: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_arena_propagates() {
        let mut config = ServerConfig::default();
        config.arena.height = -1.0;
        assert!(config.validate().is_err());
    }
}
