//! Top-level orchestration: enumerate colors, walk the frontier driver,
//! and encode the result (§5, §9).

use log::info;

use crate::color;
use crate::config::{Config, OutputMode, Selection};
use crate::error::Result;
use crate::frontier::Frontier;
use crate::grid::Bitmap;
use crate::pass;
use crate::png_writer;
use crate::rng::KdRng;

/// How many trailing copies of the final frame `animate` mode appends so
/// playback holds on the finished image instead of cutting off the
/// instant the last pixel lands.
const TRAILING_FRAMES: u32 = 120;

/// Runs one full generation: enumerates `2^bit_depth` colors, places
/// each one via the configured frontier driver, and writes the result
/// per `config.output`. Returns the finished grid either way, so callers
/// (and tests) can inspect it without re-reading the PNG back off disk.
pub fn generate(config: &Config) -> Result<Bitmap> {
    let width = config.width();
    let height = config.height();
    info!(
        "generating a {}x{} grid at bit depth {} (selection={:?}, color_space={:?}, seed={})",
        width, height, config.bit_depth, config.selection, config.color_space, config.seed
    );

    let mut rng = KdRng::seed_from_u32(config.seed);
    let colors = color::enumerate(config.bit_depth, config.order, &mut rng)?;

    // Component E paces consumption of the color stream itself, not the
    // grid: `schedule[k]` is the index into `colors` that driver step `k`
    // places.
    let schedule = pass::schedule(colors.len(), config.bit_depth);

    // The seed pixel is always the grid's center, regardless of color
    // order.
    let seed_idx = (height / 2) as usize * width as usize + (width / 2) as usize;

    let mut frontier = Frontier::new(width, height, config.selection, config.color_space);
    let mut bitmap = Bitmap::new(width, height);
    let mut progress = pbr::ProgressBar::new(colors.len() as u64);
    progress.message("placing colors ");

    // The first color is seeded directly: per the driver's design, the
    // very first pixel never goes through a forest lookup or insertion.
    let seed_color = colors[schedule[0]];
    frontier.place_color(seed_idx, seed_color);
    bitmap.set(seed_idx, seed_color);
    frontier.post_update(seed_idx);
    progress.inc();

    // §9(a): only MIN mode special-cases the second placement. MIN's
    // frontier holds *filled* pixels, and the seed is the only one any
    // unfilled neighbor could point back to, so a direct nearest-neighbor
    // query and a random pick agree; the original implementation skips
    // the query rather than compute a no-op lookup. MEAN's frontier holds
    // the seed's unfilled neighbors themselves (inserted by the seed's
    // `post_update` above), so it is never empty at this point and must
    // go through the normal `nearest`-driven path like every later color.
    let second_color = colors[schedule[1]];
    let second_idx = match config.selection {
        Selection::Min => {
            let idx = frontier
                .random_unfilled_neighbor(seed_idx, &mut rng)
                .expect("a freshly seeded grid always has an unfilled neighbor");
            frontier.place_color(idx, second_color);
            frontier.post_update(idx);
            idx
        }
        Selection::Mean => frontier.place_next(second_color, &mut rng)?,
    };
    bitmap.set(second_idx, second_color);
    progress.inc();

    let animate_dir = match &config.output {
        OutputMode::Animate(dir) => Some(dir.clone()),
        OutputMode::Single(_) => None,
    };
    let mut frame_index = 0u32;
    if let Some(dir) = &animate_dir {
        std::fs::create_dir_all(dir)?;
        png_writer::write_frame(dir, frame_index, &bitmap)?;
        frame_index += 1;
    }

    for (placed, &color_idx) in schedule.iter().enumerate().skip(2) {
        let color = colors[color_idx];
        let idx = frontier.place_next(color, &mut rng)?;
        bitmap.set(idx, color);
        progress.inc();
        if let Some(dir) = &animate_dir {
            if (placed + 1) % width as usize == 0 {
                png_writer::write_frame(dir, frame_index, &bitmap)?;
                frame_index += 1;
            }
        }
    }
    progress.finish_print("done");

    match &config.output {
        OutputMode::Single(path) => {
            png_writer::write_single(path, &bitmap)?;
            info!("wrote {}", path.display());
        }
        OutputMode::Animate(dir) => {
            let last = frame_index.saturating_sub(1);
            for _ in 0..TRAILING_FRAMES {
                png_writer::duplicate_frame(dir, last, frame_index)?;
                frame_index += 1;
            }
            info!("wrote {} frames to {}", frame_index, dir.display());
        }
    }

    Ok(bitmap)
}
