use std::sync::Arc;

use tenant_id::{CredentialGenerator, SidGenerator, SystemClock};

use crate::server::config::ServerConfig;

/// Shared handler state.
///
/// Both generators are built once at bootstrap and handed to every request
/// through this state; there are no process-wide generator globals.
#[derive(Clone)]
pub struct AppState {
    pub sids: Arc<SidGenerator<SystemClock>>,
    pub credentials: Arc<CredentialGenerator>,
    pub sid_tag: Arc<str>,
    pub app_id_len: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            sids: Arc::new(SidGenerator::with_config(
                config.generator.clone(),
                SystemClock,
            )),
            credentials: Arc::new(CredentialGenerator::default()),
            sid_tag: Arc::from(config.sid_tag.as_str()),
            app_id_len: config.app_id_len,
        }
    }
}
