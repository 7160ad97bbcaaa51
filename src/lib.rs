pub mod algorithm;
pub mod detail;
pub mod statistic;
pub mod storage;

/// planar measurement types
pub type Coord = f64;
/// (width, height) of a detail; width is the side the detail is placed along
pub type Size = (Coord, Coord);

/// initialize logging: terminal at info, timestamped logfile at debug
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// get a database connection and return the client
pub async fn db() -> Result<std::sync::Arc<tokio_postgres::Client>, crate::algorithm::PackError> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let url = std::env::var("DB_URL").map_err(|_| {
        crate::algorithm::PackError::InvalidConfiguration("DB_URL must be set".to_string())
    })?;
    let (client, connection) = tokio_postgres::connect(&url, tls).await?;
    tokio::spawn(connection);
    Ok(std::sync::Arc::new(client))
}
