use std::sync::Arc;

use crate::clients::habbo::HabboClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, AuthService, SeaOrmAccountService, SeaOrmAuthService,
};

/// Everything a request handler needs, constructed once at startup and passed
/// in explicitly. No global singletons.
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub habbo: Arc<HabboClient>,

    pub accounts: Arc<dyn AccountService>,

    pub auth: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        store.ping().await?;

        let habbo = Arc::new(HabboClient::new(
            &config.habbo.base_url,
            config.habbo.request_timeout_seconds,
        )?);

        let accounts = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            habbo.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService>;

        let auth = Arc::new(SeaOrmAuthService::new(store.clone())) as Arc<dyn AuthService>;

        Ok(Self {
            config,
            store,
            habbo,
            accounts,
            auth,
        })
    }
}
