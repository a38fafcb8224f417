use anyhow::{Result, bail};
use clap::Parser;
use pdf_stamp::{CropMode, CropRequest, PlacementConfig, SkipCategories, StampJob};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pdfstamp",
    about = "Stamp images onto PDF pages and adjust crop boxes",
    version
)]
struct Cli {
    /// Input PDF file
    #[arg(short, long)]
    input: PathBuf,

    /// Output PDF file
    #[arg(short, long, required_unless_present = "page_size")]
    output: Option<PathBuf>,

    /// Placement configuration (JSON, or YAML for .yaml/.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip fixed images
    #[arg(long)]
    skip_images: bool,

    /// Skip random pool images
    #[arg(long)]
    skip_random: bool,

    /// Skip disposable pool images
    #[arg(long)]
    skip_disposable: bool,

    /// Log every page operation
    #[arg(short, long)]
    verbose: bool,

    /// Print the size of this page (zero-based) and exit without saving
    #[arg(long, value_name = "PAGE")]
    page_size: Option<usize>,

    /// Crop by percentage: WIDTH [HEIGHT]; negative values crop from the start of the axis
    #[arg(
        long,
        num_args = 1..=2,
        value_names = ["WIDTH", "HEIGHT"],
        allow_negative_numbers = true,
        conflicts_with = "crop_points"
    )]
    crop_percent: Option<Vec<f32>>,

    /// Crop in points: WIDTH HEIGHT [X] [Y], origin at the top-left corner
    #[arg(long, num_args = 2..=4, value_names = ["WIDTH", "HEIGHT", "X", "Y"])]
    crop_points: Option<Vec<f32>>,

    /// Page the crop applies to (zero-based)
    #[arg(long, default_value = "0")]
    crop_page: usize,

    /// Seed for random pool selection
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn crop_request(&self) -> Option<CropRequest> {
        let mode = if let Some(values) = &self.crop_percent {
            CropMode::Percent {
                width_percent: values[0],
                height_percent: values.get(1).copied().unwrap_or(100.0),
            }
        } else if let Some(values) = &self.crop_points {
            CropMode::Absolute {
                width: values[0],
                height: values[1],
                x: values.get(2).copied().unwrap_or(0.0),
                y: values.get(3).copied().unwrap_or(0.0),
            }
        } else {
            return None;
        };

        Some(CropRequest {
            page_index: self.crop_page,
            mode,
        })
    }

    fn skip(&self) -> SkipCategories {
        SkipCategories {
            images: self.skip_images,
            random_images: self.skip_random,
            disposable_random_images: self.skip_disposable,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let document = pdf_stamp::load_pdf(&cli.input).await?;

    if let Some(page) = cli.page_size {
        let (width, height) = pdf_stamp::page_dimensions(&document, page)?;
        println!("Page {}: {} x {} pt", page, width, height);
        return Ok(());
    }

    let skip = cli.skip();
    let config = match &cli.config {
        Some(path) => {
            let config = PlacementConfig::load(path).await?;
            if config.is_empty() {
                log::warn!("Configuration {} lists no images", path.display());
            }
            config
        }
        None if skip.all() => PlacementConfig::default(),
        None => bail!("--config is required unless every image category is skipped"),
    };

    let job = StampJob {
        config,
        crops: cli.crop_request().into_iter().collect(),
        skip,
        seed: cli.seed,
    };

    if !job.has_work() {
        log::info!("Nothing to do, output not written");
        return Ok(());
    }

    let Some(output) = cli.output.as_ref() else {
        bail!("--output is required");
    };

    let (stamped, report) = pdf_stamp::stamp(document, &job).await?;
    pdf_stamp::save_pdf(stamped, output).await?;

    println!("Stamp Summary:");
    println!("  Crops applied: {}", report.crops_applied);
    println!("  Images placed: {}", report.images_placed);
    println!("  Images disposed: {}", report.disposed.len());
    if !report.directories_ok {
        println!("  Some directories could not be created");
    }
    if !report.warnings.is_empty() {
        println!("  Warnings: {}", report.warnings.len());
        for warning in &report.warnings {
            println!("    - {}", warning);
        }
    }
    println!("Stamped → {}", output.display());

    Ok(())
}
