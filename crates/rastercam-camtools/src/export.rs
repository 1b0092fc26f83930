//! Toolpath export.
//!
//! SVG output draws every path into one document at 90 DPI with the Y axis
//! flipped, so the drawing reads the same way up as the source image. JSON
//! output is the serde form of the path list and can be read back.

use crate::error::{CamToolError, CamToolResult};
use rastercam_core::{merged_bounds, Bounds, Path};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use tracing::info;

/// User units per millimeter at 90 DPI
pub const SVG_SCALE: f32 = 90.0 / 25.4;

/// SVG rendering options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvgOptions {
    /// Margin added on every side, as a fraction of the drawing's extent
    pub border: f32,
    /// Stroke width in user units
    pub stroke: f32,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            border: 0.0,
            stroke: 0.1,
        }
    }
}

/// Drawing extent with the border applied
fn framed_bounds(paths: &[Path], border: f32) -> Bounds {
    let Some(b) = merged_bounds(paths) else {
        return Bounds::at(0.0, 0.0);
    };
    let (dx, dy) = (b.width() * border, b.height() * border);
    Bounds {
        xmin: b.xmin - dx,
        xmax: b.xmax + dx,
        ymin: b.ymin - dy,
        ymax: b.ymax + dy,
    }
}

/// Write every path into one SVG document.
///
/// Points are placed at `scale * (x - xmin)`, `scale * (ymax - y)`; closed
/// paths end with `Z`. Empty paths are skipped.
pub fn write_svg<W: Write>(out: &mut W, paths: &[Path], options: &SvgOptions) -> CamToolResult<()> {
    let frame = framed_bounds(paths, options.border);
    let xy = |x: f32, y: f32| (SVG_SCALE * (x - frame.xmin), SVG_SCALE * (frame.ymax - y));

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#)?;
    writeln!(
        out,
        "<!-- Generated by rastercam {} on {} -->",
        env!("CARGO_PKG_VERSION"),
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}mm" height="{}mm" units="mm">"#,
        frame.width(),
        frame.height()
    )?;

    for path in paths.iter().filter(|p| !p.is_empty()) {
        write!(
            out,
            r#"  <path style="stroke:rgb(0,0,0); stroke-width:{}; fill:none" d=""#,
            options.stroke
        )?;
        for (k, p) in path.points().iter().enumerate() {
            let (x, y) = xy(p.x, p.y);
            let command = if k == 0 { "M" } else { " L" };
            write!(out, "{}{} {}", command, x, y)?;
        }
        if path.closed {
            write!(out, " Z")?;
        }
        writeln!(out, r#""/>"#)?;
    }

    writeln!(out, "</svg>")?;
    Ok(())
}

/// Save paths as an SVG file
pub fn save_svg(
    path: impl AsRef<std::path::Path>,
    paths: &[Path],
    options: &SvgOptions,
) -> CamToolResult<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    write_svg(&mut out, paths, options)?;
    out.flush()?;
    info!("Wrote {} paths to {}", paths.len(), path.as_ref().display());
    Ok(())
}

/// Save paths as pretty-printed JSON
pub fn save_json(path: impl AsRef<std::path::Path>, paths: &[Path]) -> CamToolResult<()> {
    let out = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(out, paths)?;
    info!("Wrote {} paths to {}", paths.len(), path.as_ref().display());
    Ok(())
}

/// Load paths previously written by [`save_json`]
pub fn load_json(path: impl AsRef<std::path::Path>) -> CamToolResult<Vec<Path>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

/// Save paths in the format named by the file extension (`.svg` or `.json`)
pub fn save_paths(
    path: impl AsRef<std::path::Path>,
    paths: &[Path],
    options: &SvgOptions,
) -> CamToolResult<()> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("svg") => save_svg(path, paths, options),
        Some("json") => save_json(path, paths),
        _ => Err(CamToolError::InvalidParameters(format!(
            "cannot infer toolpath format from '{}' (expected .svg or .json)",
            path.display()
        ))),
    }
}
