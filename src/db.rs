use sqlx::MySqlPool;
use tracing::info;

/// Connects to MySQL and applies any pending migrations.
pub async fn init_db(database_url: &str) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database connected and migrated");
    Ok(pool)
}
