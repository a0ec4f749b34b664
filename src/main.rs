//! Invoicer dashboard server
//!
//! Configuration is read from the YAML file named by `INVOICER_CONFIG`, or
//! the built-in defaults, then `POSTGRES_URL` / `INVOICER_BIND_ADDR`
//! override it. Without a database URL the server runs on in-memory stores
//! seeded with one demo user and customer.

use anyhow::Result;
use invoicer::prelude::*;
use tracing_subscriber::EnvFilter;

const DEMO_EMAIL: &str = "user@nextmail.com";
const DEMO_PASSWORD: &str = "123456";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::var("INVOICER_CONFIG") {
        Ok(path) => {
            tracing::info!(path = %path, "loading configuration");
            AppConfig::from_yaml_file(&path)?
        }
        Err(_) => AppConfig::default_config(),
    }
    .with_env_overrides();

    let builder = ServerBuilder::new(config.clone());

    let builder = match config.database.url.as_deref() {
        #[cfg(feature = "postgres")]
        Some(url) => {
            use invoicer::storage::postgres::{connect, ensure_schema};

            let pool = connect(
                url,
                config.database.max_connections,
                config.database.require_ssl,
            )
            .await?;
            ensure_schema(&pool).await?;
            tracing::info!("connected to PostgreSQL");
            builder.with_store(PostgresStore::new(pool))
        }
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            anyhow::bail!("a database URL is configured but the `postgres` feature is disabled");
        }
        None => {
            tracing::warn!("no database URL configured, using in-memory stores");
            builder.with_store(demo_store()?)
        }
    };

    builder.serve().await
}

fn demo_store() -> Result<InMemoryStore> {
    let hash = bcrypt::hash(DEMO_PASSWORD, bcrypt::DEFAULT_COST)?;
    let store = InMemoryStore::new()
        .with_user(User::new(
            uuid::Uuid::new_v4().to_string(),
            "User",
            DEMO_EMAIL,
            hash,
        ))
        .with_customer(Customer {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Evil Rabbit".to_string(),
            email: "evil@rabbit.com".to_string(),
            image_url: "/customers/evil-rabbit.png".to_string(),
        });

    tracing::info!(email = DEMO_EMAIL, "seeded demo user");
    Ok(store)
}
