use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub dir: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = StoreConfig {
            dir: std::env::var("STORE_DIR").unwrap_or_else(|_| "./data".into()),
            prefix: std::env::var("STORE_PREFIX").unwrap_or_else(|_| "platelog".into()),
        };
        let ai = AiConfig {
            base_url: std::env::var("AI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".into()),
            // a missing key is not fatal: collaborator calls degrade to fallbacks
            api_key: std::env::var("AI_API_KEY").ok(),
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            max_tokens: std::env::var("AI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(512),
        };
        Ok(Self { store, ai })
    }
}
