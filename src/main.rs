mod annotate;
mod batch;
mod build_info;
mod colors;
mod config;
mod errors;
mod exif_utils;
mod geometry;
mod label;
mod logging;
mod text;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
#[allow(unused_imports)]
use log::{debug, info, warn, error};

use crate::annotate::Annotator;
use crate::batch::{BatchPaths, RunReport};
use crate::build_info::BuildInfo;
use crate::config::{ClassConfig, DEFAULT_CLASSES_YAML};
use crate::errors::AppError;
use crate::text::{FontTextRenderer, TextRenderer};

/// Draw bounding boxes from YOLO format txt labels onto images
#[derive(Parser, Debug)]
#[command(name = "bboxviz", version, long_version = BuildInfo::LONG_VERSION)]
struct Args {
    /// Path to the images directory
    #[arg(long = "images_dir")]
    images_dir: PathBuf,

    /// Path to the labels directory
    #[arg(long = "labels_dir")]
    labels_dir: PathBuf,

    /// Path to the output directory
    #[arg(long = "output_dir")]
    output_dir: PathBuf,

    /// Path to the YAML file describing the classes (nc, names, class_clrs)
    #[arg(long = "classes_yaml", default_value = DEFAULT_CLASSES_YAML)]
    classes_yaml: PathBuf,

    /// Write the class name on top of each bounding box
    #[arg(long = "show_text")]
    show_text: bool,

    /// Font file for --show_text, instead of a system font
    #[arg(long)]
    font: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

/// Loads everything that can fail fatally, then runs the batch.
fn execute(args: &Args) -> Result<RunReport, AppError> {
    let classes = ClassConfig::load(&args.classes_yaml)?;

    let font = if args.show_text {
        Some(FontTextRenderer::load(args.font.as_deref())?)
    } else {
        None
    };
    let annotator = Annotator::new(&classes, font.as_ref().map(|f| f as &dyn TextRenderer));

    let paths = BatchPaths {
        images_dir: args.images_dir.clone(),
        labels_dir: args.labels_dir.clone(),
        output_dir: args.output_dir.clone(),
    };
    batch::run(&paths, &annotator, classes.class_count())
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::setup_logger(args.verbose);
    logging::setup_panic_hook();
    info!("bboxviz {}", BuildInfo::display_version());
    debug!("{:?}", args);

    match execute(&args) {
        Ok(report) => {
            println!("max w: {}, h: {}", report.extent.max_width, report.extent.max_height);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
