use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use log::debug;

use crate::{
    ExtractOptions, Palette, Progress, RegionFile, Result, Rgba, SurfaceExtractor, SurfaceGrid,
};

/// Height difference to a neighbour above which a cell is shaded.
const EDGE_THRESHOLD: i32 = 3;

/// Height difference at which shading reaches full strength.
const FULL_SHADE_DELTA: f64 = 50.0;

/// How far towards black a fully shaded cell goes.
const MAX_DARKEN: f64 = 0.7;

/// Draws a [`SurfaceGrid`] one pixel per column, darkening columns that sit
/// on a cliff or ledge so relief shows up like contour lines.
pub struct ShadeRenderer<'a, P: Palette> {
    palette: &'a P,
}

impl<'a, P: Palette> ShadeRenderer<'a, P> {
    pub fn new(palette: &'a P) -> Self {
        Self { palette }
    }

    pub fn render(&self, grid: &SurfaceGrid) -> RgbaImage {
        let width = grid.width();

        // Regions have a few dozen distinct surface blocks at most, so pick
        // each colour once rather than once per pixel.
        let mut colours: HashMap<&str, Rgba> = HashMap::new();
        for cell in grid.cells() {
            colours
                .entry(&*cell.block_id)
                .or_insert_with(|| self.palette.pick(&cell.block_id));
        }

        let mut img = RgbaImage::new(width as u32, width as u32);

        for z in 0..width {
            for x in 0..width {
                let cell = grid.get(x, z);
                let base = colours[&*cell.block_id];
                let colour = edge_shade(base, max_neighbour_delta(grid, x, z));
                img.put_pixel(x as u32, z as u32, image::Rgba(colour));
            }
        }

        img
    }
}

/// Largest absolute height difference between the cell at `x`, `z` and its
/// up to four direct neighbours.
fn max_neighbour_delta(grid: &SurfaceGrid, x: usize, z: usize) -> i32 {
    let height = grid.get(x, z).height;
    let width = grid.width();

    let mut neighbours = Vec::with_capacity(4);
    if x > 0 {
        neighbours.push((x - 1, z));
    }
    if x + 1 < width {
        neighbours.push((x + 1, z));
    }
    if z > 0 {
        neighbours.push((x, z - 1));
    }
    if z + 1 < width {
        neighbours.push((x, z + 1));
    }

    neighbours
        .into_iter()
        .map(|(nx, nz)| (height - grid.get(nx, nz).height).abs())
        .max()
        .unwrap_or(0)
}

fn edge_shade(colour: Rgba, delta: i32) -> Rgba {
    if delta <= EDGE_THRESHOLD {
        return colour;
    }

    let intensity = (delta as f64 / FULL_SHADE_DELTA).min(1.0);
    let factor = 1.0 - intensity * MAX_DARKEN;
    let darken = |c: u8| (c as f64 * factor) as u8;

    [
        darken(colour[0]),
        darken(colour[1]),
        darken(colour[2]),
        colour[3],
    ]
}

/// Read the region file at `path`, extract its surface and draw it.
pub fn render_region<P: Palette>(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
    palette: &P,
) -> Result<RgbaImage> {
    let region = RegionFile::open(path)?;
    let extractor = SurfaceExtractor::new(options.clone())?;

    let grid = extractor.top_blocks(
        &region,
        options.region_size,
        options.sample_interval,
        &|p: Progress| {
            debug!(
                "{}/{} chunks, {:.1} chunks/s, {} blocks",
                p.processed, p.total, p.chunks_per_second, p.distinct_blocks
            )
        },
    )?;
    drop(region);

    extractor.shutdown(options.shutdown_grace());
    Ok(ShadeRenderer::new(palette).render(&grid))
}
