use std::time::Duration;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{config::Config, errors::AppResult};

const APP_NAME: &str = "quiz-maker-server";

/// Handle on the quiz database. Cheap to clone, shares one connection pool.
#[derive(Clone)]
pub struct Database {
    inner: mongodb::Database,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
        options.app_name = Some(APP_NAME.to_string());
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.max_pool_size = Some(10);
        options.min_pool_size = Some(2);
        options.connect_timeout = Some(Duration::from_secs(5));
        options.server_selection_timeout = Some(Duration::from_secs(5));

        let inner = Client::with_options(options)?.database(&config.mongo_db_name);
        let database = Self { inner };
        database.health_check().await?;

        log::info!("Connected to MongoDB database '{}'", database.name());
        Ok(database)
    }

    pub fn get_collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.inner.collection(name)
    }

    /// Round-trips a `ping` to the server hosting the quiz database.
    pub async fn health_check(&self) -> AppResult<()> {
        self.inner.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }
}
