//! Service configuration read from the environment.
use std::env;
use std::net::SocketAddr;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";
/// Default cap on concurrently open games.
pub const DEFAULT_MAX_GAMES: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub addr: SocketAddr,
    pub max_games: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_games: DEFAULT_MAX_GAMES,
        }
    }
}

impl ApiConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `COTULENH_API_ADDR` - listen address (default: 0.0.0.0:8000)
    /// - `COTULENH_MAX_GAMES` - maximum open games (default: 1024, minimum 1)
    ///
    /// Unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(addr) = read_env::<SocketAddr>("COTULENH_API_ADDR") {
            config.addr = addr;
        }
        if let Some(max) = read_env::<usize>("COTULENH_MAX_GAMES") {
            config.max_games = max.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
