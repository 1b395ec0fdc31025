//! Print the markers a tile payload would produce.
//!
//! Reads a tile from disk, or fetches one through the HTTP tile source, then
//! decodes and classifies every feature in the points layer.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use tiledmarkers::{
    Error, HttpTileSource, LayerConfig, MarkerDescriptor, POINTS_LAYER, SizeBucket, TileAddress,
    TileSource, classify,
};

#[derive(Parser)]
#[command(about = "Decode a marker tile and list the markers it would draw")]
struct CliArgs {
    /// Tile payload on disk. Ignored when `--url` is given.
    path: Option<PathBuf>,

    /// URL template to fetch from, with `{z}`, `{x}` and `{y}` placeholders.
    #[arg(long)]
    url: Option<String>,

    /// Layer options as JSON. `--url` overrides its template.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Zoom level of the tile to fetch.
    #[arg(long, default_value_t = 0)]
    z: u8,

    /// Column of the tile to fetch.
    #[arg(long, default_value_t = 0)]
    x: u32,

    /// Row of the tile to fetch.
    #[arg(long, default_value_t = 0)]
    y: u32,

    /// Count rows from the opposite edge when building the URL.
    #[arg(long)]
    flip_rows: bool,

    /// Layer to read features from.
    #[arg(long, default_value = POINTS_LAYER)]
    layer: String,
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), Error> {
    let payload = load_payload(args)?;
    let features = tiledmarkers_decode::decode_layer(&payload, &args.layer)?;
    tracing::info!(
        bytes = payload.len(),
        features = features.len(),
        layer = %args.layer,
        "decoded tile"
    );

    let mut summary: BTreeMap<&'static str, usize> = BTreeMap::new();
    for feature in &features {
        let marker = classify(feature);
        println!("{}", describe(&marker));
        *summary.entry(summary_key(&marker)).or_default() += 1;
    }

    for (kind, count) in &summary {
        println!("{kind:>16}: {count}");
    }
    Ok(())
}

fn load_payload(args: &CliArgs) -> Result<Vec<u8>, Error> {
    let mut config = match &args.config {
        Some(path) => {
            let json = read_file(path)?;
            let json = String::from_utf8(json).map_err(|e| Error::Config {
                detail: format!("{} is not UTF-8: {e}", path.display()),
            })?;
            LayerConfig::from_json_str(&json)?
        }
        None => LayerConfig::default(),
    };

    let remote = args.url.is_some() || (args.config.is_some() && args.path.is_none());
    if !remote {
        let Some(path) = &args.path else {
            return Err(Error::Config {
                detail: "pass a tile path, --url or --config".to_string(),
            });
        };
        return read_file(path);
    }

    if let Some(url) = &args.url {
        config.tile_url.clone_from(url);
    }
    config.flip_rows |= args.flip_rows;

    let source = HttpTileSource::from_config(&config)?;
    let address = TileAddress::new(args.z, args.x, args.y);
    tracing::info!(%address, url = %source.resource_url(address), "fetching tile");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Config {
            detail: format!("failed to start runtime: {e}"),
        })?;
    runtime.block_on(source.fetch(address))
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| Error::Config {
        detail: format!("failed to read {}: {e}", path.display()),
    })
}

fn describe(marker: &MarkerDescriptor) -> String {
    match marker {
        MarkerDescriptor::Cluster {
            position,
            size,
            label,
        } => format!(
            "cluster  ({:.3}, {:.3}) {size} \"{label}\"",
            position.x, position.y
        ),
        MarkerDescriptor::Ellipse {
            position,
            semi_axes,
            rotation_degrees,
            content,
        } => format!(
            "ellipse  ({:.3}, {:.3}) axes ({:.3}, {:.3}) rot {rotation_degrees:.1}° {content}",
            position.x, position.y, semi_axes.x, semi_axes.y
        ),
        MarkerDescriptor::Point { position, content } => {
            format!("point    ({:.3}, {:.3}) {content}", position.x, position.y)
        }
    }
}

fn summary_key(marker: &MarkerDescriptor) -> &'static str {
    match marker {
        MarkerDescriptor::Cluster { size, .. } => match size {
            SizeBucket::Small => "cluster small",
            SizeBucket::Medium => "cluster medium",
            SizeBucket::Large => "cluster large",
            SizeBucket::XLarge => "cluster x-large",
        },
        MarkerDescriptor::Ellipse { .. } => "ellipse",
        MarkerDescriptor::Point { .. } => "point",
    }
}
