use {
    anyhow::Context,
    sqlx::{
        postgres::PgPoolOptions,
        Pool,
        Postgres,
    },
};

pub type DB = Pool<Postgres>;

const MAX_DB_CONNECTIONS: u32 = 10;

pub async fn connect(database_url: &str) -> anyhow::Result<DB> {
    let db = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(database_url)
        .await
        .context("Failed to connect to the database")?;
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run database migrations")?;
    Ok(db)
}
