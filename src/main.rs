use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use slackpack::algorithm::*;
use slackpack::detail::*;
use slackpack::statistic::*;
use slackpack::storage::*;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Shape {
    Squares,
    Rectangles,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Memory,
    Database,
    Partitioned,
}

/// Pack a harmonic stream of details onto the sheet.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// slack exponent
    #[arg(long, default_value_t = 4.0 / 3.0)]
    gamma: f64,
    /// index of the first detail
    #[arg(long, default_value_t = 100)]
    n0: usize,
    /// number of details to place
    #[arg(long, default_value_t = 100)]
    max_placed: usize,
    /// size stream
    #[arg(long, value_enum, default_value = "squares")]
    shape: Shape,
    /// for rectangles: emit the smaller side as the width
    #[arg(long)]
    width_is_smaller: bool,
    /// box storage backend; the external ones read DB_URL
    #[arg(long, value_enum, default_value = "memory")]
    storage: Backend,
    /// rows kept in the external storage caches
    #[arg(long, default_value_t = 1_000_000)]
    cache_size: usize,
    /// approximate boxes per partition (partitioned backend)
    #[arg(long, default_value_t = 1_000_000)]
    boxes_per_partition: usize,
    /// table name for the external backends
    #[arg(long, default_value = "boxes")]
    table: String,
    /// progress and timing cadence, in placed details
    #[arg(long, default_value_t = 10)]
    report_each: usize,
    /// track the LRP share of free area into this file at each cut
    #[arg(long)]
    lrp_log: Option<std::path::PathBuf>,
    /// keep engine state only, skip maintaining the placement list
    #[arg(long)]
    skip_placements: bool,
    /// write the final placement list as JSON
    #[arg(long)]
    output: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    slackpack::init();
    let args = Args::parse();
    let placed = match args.shape {
        Shape::Squares => pack(&args, HarmonicSquares::new(args.n0)?).await?,
        Shape::Rectangles => {
            pack(&args, HarmonicRectangles::new(args.n0, args.width_is_smaller)?).await?
        }
    };
    log::info!("{} rectangles in the final placement list", placed.len());
    if let Some(path) = args.output.as_ref() {
        save_json(&placed, path)?;
        log::info!("placements written to {}", path.display());
    }
    Ok(())
}

async fn pack(args: &Args, generator: impl DetailGenerator) -> Result<Vec<Detail>> {
    match args.storage {
        Backend::Memory => run(args, generator, InMemoryBoxStorage::new()).await,
        Backend::Database => {
            let client = slackpack::db().await?;
            let storage = DatabaseBoxStorage::new(client, &args.table, args.cache_size).await?;
            run(args, generator, storage).await
        }
        Backend::Partitioned => {
            let client = slackpack::db().await?;
            let storage = PartitionedBoxStorage::new(
                client,
                &args.table,
                args.cache_size,
                args.n0,
                args.gamma,
                args.max_placed,
                args.boxes_per_partition,
            )
            .await?;
            run(args, generator, storage).await
        }
    }
}

async fn run(
    args: &Args,
    generator: impl DetailGenerator,
    storage: impl BoxStorage,
) -> Result<Vec<Detail>> {
    let mut listeners: Vec<Box<dyn Listener>> = vec![
        Box::new(PrintEachN::new(args.report_each, Box::new(Console))),
        Box::new(ExecutionTimeTracker::new(args.report_each, Box::new(Console))),
        Box::new(PrintInfoAtEnd::new(Box::new(Console))),
    ];
    if let Some(path) = args.lrp_log.as_ref() {
        let sink = FileOutput::new(path, FileMode::Overwrite);
        listeners.push(match args.skip_placements {
            // the closed-form tracker works without the placement list
            true => Box::new(HarmonicLrpOccupancyRatioTracker::new(Box::new(sink))),
            false => Box::new(LrpOccupancyRatioTracker::new(Box::new(sink))),
        });
    }
    let mut engine = SlackPack::new(args.gamma, args.n0, args.max_placed, storage)?
        .with_listeners(listeners)
        .with_update_placements(!args.skip_placements);
    let sheet = base_sheet(&generator);
    let placer = DetailPlacer::new(generator, &mut engine, sheet, args.max_placed);
    Ok(placer.run().await)
}
