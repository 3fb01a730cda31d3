use std::sync::Arc;

use crate::agent::client::{OpenAiCompatClient, ReasoningClient};
use crate::config::AppConfig;
use crate::store::{FileStore, KvStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn KvStore>,
    pub ai: Arc<dyn ReasoningClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = Arc::new(FileStore::new(&config.store.dir).await?) as Arc<dyn KvStore>;
        let ai = Arc::new(OpenAiCompatClient::new(&config.ai)) as Arc<dyn ReasoningClient>;

        Ok(Self { config, store, ai })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn KvStore>,
        ai: Arc<dyn ReasoningClient>,
    ) -> Self {
        Self { config, store, ai }
    }

    pub fn fake() -> Self {
        use std::collections::HashMap;
        use std::sync::Mutex;

        use async_trait::async_trait;
        use bytes::Bytes;

        use crate::agent::client::AgentError;
        use crate::store::StoreError;

        #[derive(Default)]
        struct MemoryStore {
            inner: Mutex<HashMap<String, String>>,
        }

        #[async_trait]
        impl KvStore for MemoryStore {
            async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
                Ok(self.inner.lock().unwrap().get(key).cloned())
            }
            async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
                self.inner
                    .lock()
                    .unwrap()
                    .insert(key.to_string(), value.to_string());
                Ok(())
            }
            async fn remove(&self, key: &str) -> Result<(), StoreError> {
                self.inner.lock().unwrap().remove(key);
                Ok(())
            }
        }

        struct CannedReasoning;

        #[async_trait]
        impl ReasoningClient for CannedReasoning {
            async fn analyze_image(
                &self,
                _prompt: &str,
                _image: Bytes,
                _content_type: &str,
            ) -> Result<String, AgentError> {
                Ok(r#"{"food_name":"Canned soup","is_food":true,"confidence":0.9,"nutrition":{"calories":180,"protein_g":8,"carbs_g":22,"fat_g":6}}"#.into())
            }
            async fn generate_advice(&self, _prompt: &str) -> Result<String, AgentError> {
                Ok(r#"{"status":"optimal","reasoning":"On track.","suggestion":"Keep it up."}"#
                    .into())
            }
        }

        let config = Arc::new(AppConfig {
            store: crate::config::StoreConfig {
                dir: "unused".into(),
                prefix: "platelog".into(),
            },
            ai: crate::config::AiConfig {
                base_url: "http://fake.local".into(),
                api_key: None,
                model: "fake".into(),
                max_tokens: 64,
            },
        });

        Self {
            config,
            store: Arc::new(MemoryStore::default()),
            ai: Arc::new(CannedReasoning),
        }
    }
}
