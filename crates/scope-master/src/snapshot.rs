//! PNG encoding for rendered scope frames.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::framebuffer::Framebuffer;
use crate::MasterError;

pub fn write_png(w: impl Write, frame: &Framebuffer) -> Result<(), MasterError> {
    let mut encoder = png::Encoder::new(w, frame.width(), frame.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.to_rgba())?;
    writer.finish()?;
    Ok(())
}

pub fn frame_to_png(frame: &Framebuffer) -> Result<Vec<u8>, MasterError> {
    let mut buf = Vec::new();
    write_png(&mut buf, frame)?;
    Ok(buf)
}

/// Write `frame` to `path`, creating parent directories as needed.
pub fn save_png(path: &Path, frame: &Framebuffer) -> Result<(), MasterError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_png(BufWriter::new(file), frame)
}
