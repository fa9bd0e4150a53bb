use std::error::Error;
use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Parser;
use ndarray::Array2;
use tracing::{info, warn};

use boxfilter_core::filter::{BoxFilter, BoxFilterConfig, Region};

#[derive(Parser)]
#[command(name = "filter")]
#[command(about = "Drop invalid bounding boxes from a label table read on stdin")]
struct Args {
    #[arg(short, long, help = "Box filter settings as a JSON file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Region height in pixels, needed by the overlap check")]
    height: Option<f32>,

    #[arg(long, help = "Region width in pixels, needed by the overlap check")]
    width: Option<f32>,
}

/// Reads `[[class_id, xmin, ymin, xmax, ymax, ...], ...]` into a label table.
fn read_labels(input: &str) -> Result<Array2<f32>, Box<dyn Error>> {
    let rows: Vec<Vec<f32>> = serde_json::from_str(input)?;
    let columns = rows.first().map(Vec::len).unwrap_or_default();
    if let Some(idx) = rows.iter().position(|row| row.len() != columns) {
        return Err(format!("label row {idx} does not have {columns} columns").into());
    }

    let labels = Array2::from_shape_vec((rows.len(), columns), rows.concat())?;
    Ok(labels)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut box_filter = match &args.config {
        Some(path) => {
            info!("Loading box filter settings from {}", path.display());
            BoxFilter::from_json_str(&std::fs::read_to_string(path)?)?
        }
        None => BoxFilter::new(BoxFilterConfig::default())?,
    };

    let region = Region::from_parts(args.height, args.width);
    if region.is_none() && box_filter.config().check_overlap {
        warn!("Overlap check is enabled, pass both --height and --width");
    }

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let labels = read_labels(&input)?;
    info!("Read {} labels with {} columns", labels.nrows(), labels.ncols());

    let kept = box_filter.apply(labels.view(), region)?;
    info!("Kept {} of {} labels", kept.nrows(), labels.nrows());

    let rows = kept.rows().into_iter().map(|row| row.to_vec()).collect::<Vec<_>>();
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, &rows)?;
    writeln!(stdout)?;

    Ok(())
}
