use std::io;

use dotenvy::dotenv;
use pos_orders::{build_server, create_pool, run_migrations, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url, config.pool).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{} (tax rate {}, store offset {})",
        config.host,
        config.port,
        config.orders.tax_rate,
        config.orders.store_offset
    );

    build_server(pool, config.orders, &config.host, config.port)?.await
}
