//! Command-line front end for `kd_forest`: turns `structopt` arguments
//! into a `Config` and hands off to `kd_forest::generate`.

use std::path::PathBuf;
use std::process::exit;

use error_chain::ChainedError;
use structopt::StructOpt;

use kd_forest::{ColorSpace, Config, OrderMode, OutputMode, Selection};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "kd-forest",
    about = "Places every color of the RGB cube onto a pixel grid so neighboring pixels look alike."
)]
struct Opt {
    /// Enumerate 2^bit-depth colors (2..=24).
    #[structopt(short = "b", long = "bit-depth", default_value = "24")]
    bit_depth: u32,

    /// How the color source is ordered before placement.
    #[structopt(
        short,
        long,
        possible_values = &["sequential", "morton", "hilbert", "hue-sort", "random"],
        default_value = "hue-sort"
    )]
    order: String,

    /// Which pixels count as the frontier.
    #[structopt(
        short,
        long,
        possible_values = &["min", "mean"],
        default_value = "min"
    )]
    selection: String,

    /// Color space nearest-neighbor comparisons run in.
    #[structopt(
        long = "color-space",
        possible_values = &["rgb", "lab", "luv"],
        default_value = "lab"
    )]
    color_space: String,

    /// Seed for the deterministic RNG (RANDOM order, MIN-mode tie-breaks).
    #[structopt(long, default_value = "0")]
    seed: u32,

    /// Write one frame every row's worth of placements into this
    /// directory instead of a single image.
    #[structopt(long)]
    animate: Option<PathBuf>,

    /// Output PNG path (ignored when --animate is set).
    #[structopt(parse(from_os_str), default_value = "kd-forest.png")]
    output: PathBuf,
}

fn parse_order(s: &str) -> OrderMode {
    match s {
        "sequential" => OrderMode::Sequential,
        "morton" => OrderMode::Morton,
        "hilbert" => OrderMode::Hilbert,
        "hue-sort" => OrderMode::HueSort,
        "random" => OrderMode::Random,
        _ => unreachable!("structopt already validated possible_values"),
    }
}

fn parse_selection(s: &str) -> Selection {
    match s {
        "min" => Selection::Min,
        "mean" => Selection::Mean,
        _ => unreachable!("structopt already validated possible_values"),
    }
}

fn parse_color_space(s: &str) -> ColorSpace {
    match s {
        "rgb" => ColorSpace::Rgb,
        "lab" => ColorSpace::Lab,
        "luv" => ColorSpace::Luv,
        _ => unreachable!("structopt already validated possible_values"),
    }
}

fn run(opt: Opt) -> kd_forest::Result<()> {
    let output = match opt.animate {
        Some(dir) => OutputMode::Animate(dir),
        None => OutputMode::Single(opt.output),
    };
    let config = Config::new(
        opt.bit_depth,
        parse_order(&opt.order),
        parse_selection(&opt.selection),
        parse_color_space(&opt.color_space),
        output,
        opt.seed,
    )?;
    kd_forest::generate(&config)?;
    Ok(())
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();
    if let Err(e) = run(opt) {
        eprint!("{}", e.display_chain());
        exit(1);
    }
}
