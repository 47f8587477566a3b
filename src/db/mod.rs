use mongodb::{
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{config::Config, errors::AppResult};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut client_options = ClientOptions::parse(&config.mongo_conn_string).await?;

        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(2);
        client_options.connect_timeout = Some(config.store_timeout());
        client_options.server_selection_timeout = Some(config.store_timeout());

        let client = Client::with_options(client_options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        log::info!("Connected to MongoDB database '{}'", config.mongo_db_name);

        Ok(Self {
            client,
            db_name: config.mongo_db_name.clone(),
        })
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.client
            .database(&self.db_name)
            .collection(collection_name)
    }
}

/// True when a write was rejected by a unique index.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}
