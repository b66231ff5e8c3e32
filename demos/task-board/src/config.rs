use strata_config::{errors::ConfigError, provider::ConfigProvider};

/// Settings for the board and its task store
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub title: String,
    pub capacity: usize,
    pub page_size: usize,
}

/// Settings for the simulated sync backend
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Builds the config registry, environment variables override the defaults
pub fn load_config() -> Result<ConfigProvider, ConfigError> {
    let board = BoardConfig {
        title: std::env::var("BOARD_TITLE").unwrap_or_else(|_| "Team Board".to_string()),
        capacity: 32,
        page_size: 5,
    };
    let http = HttpConfig {
        base_url: std::env::var("BOARD_SYNC_URL")
            .unwrap_or_else(|_| "https://sync.local/api".to_string()),
        api_key: std::env::var("BOARD_API_KEY").ok(),
    };

    let mut provider = ConfigProvider::new();
    provider.add_config(board)?.add_config(http)?;
    Ok(provider)
}
