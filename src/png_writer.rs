//! PNG encoding (§4.F). Uses the `png` crate directly rather than
//! `image`'s simple encoder so the sRGB chunk, chromaticities, and Adam7
//! interlacing are all under our control.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::Result;
use crate::grid::Bitmap;

fn encoder_for<'a, W: std::io::Write>(
    writer: W,
    bitmap: &Bitmap,
) -> png::Encoder<'a, W>
where
    W: 'a,
{
    let mut encoder = png::Encoder::new(writer, bitmap.width(), bitmap.height());
    encoder.set_color(png::ColorType::RGB);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_srgb(png::SrgbRenderingIntent::Perceptual);
    encoder.set_source_chromaticities(png::SourceChromaticities::new(
        (0.3127, 0.3290),
        (0.6400, 0.3300),
        (0.3000, 0.6000),
        (0.1500, 0.0600),
    ));
    encoder.set_interlacing(png::Interlacing::Adam7);
    encoder
}

fn write_to(path: &Path, bitmap: &Bitmap) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = encoder_for(writer, bitmap);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(bitmap.as_rgb8())?;
    Ok(())
}

/// Single-image mode: one PNG at `path`.
pub fn write_single(path: &Path, bitmap: &Bitmap) -> Result<()> {
    write_to(path, bitmap)
}

/// Animate mode: one numbered frame per checkpoint, in `dir`.
pub fn write_frame(dir: &Path, frame_index: u32, bitmap: &Bitmap) -> Result<()> {
    write_to(&frame_path(dir, frame_index), bitmap)
}

/// Copies the most recently written frame forward so playback holds on
/// the finished image instead of cutting off abruptly.
pub fn duplicate_frame(dir: &Path, from_index: u32, to_index: u32) -> Result<()> {
    std::fs::copy(frame_path(dir, from_index), frame_path(dir, to_index))?;
    Ok(())
}

fn frame_path(dir: &Path, frame_index: u32) -> std::path::PathBuf {
    dir.join(format!("{:04}.png", frame_index))
}
