//! Sprite atlas packing every procedural raster into one texture.
//!
//! ## Layout
//!
//! A 4x3 grid of square cells:
//!
//! | cell | content |
//! |------|---------|
//! | 0 | binary digit `0`, cyan |
//! | 1 | binary digit `1`, magenta |
//! | 2 | soft circle for embers |
//! | 3 | aura gradient for the beacon |
//! | 4..12 | department code glyphs, in table order |

use image::RgbaImage;

use crate::artifact::DEPARTMENTS;
use crate::error::RasterError;

use super::raster::{radial_gradient, text_glyph};

pub const ATLAS_COLUMNS: u32 = 4;
pub const ATLAS_ROWS: u32 = 3;
pub const CELL_PX: u32 = 128;

pub const CELL_DIGIT_ZERO: usize = 0;
pub const CELL_DIGIT_ONE: usize = 1;
pub const CELL_EMBER: usize = 2;
pub const CELL_AURA: usize = 3;
const FIRST_DEPARTMENT_CELL: usize = 4;

pub const EMBER_STOPS: [(f32, f32); 4] = [(0.0, 1.0), (0.3, 0.9), (0.7, 0.2), (1.0, 0.0)];
pub const AURA_STOPS: [(f32, f32); 3] = [(0.0, 0.55), (0.6, 0.10), (1.0, 0.0)];

/// Atlas cell holding the code glyph of department `index`.
pub fn department_cell(index: usize) -> usize {
    FIRST_DEPARTMENT_CELL + index % DEPARTMENTS.len()
}

pub struct SpriteAtlas {
    image: RgbaImage,
    degraded: Vec<usize>,
}

impl SpriteAtlas {
    pub const CAPACITY: usize = (ATLAS_COLUMNS * ATLAS_ROWS) as usize;

    /// Renders every cell. A cell whose raster fails is left blank and logged.
    pub fn build() -> Self {
        let mut atlas = Self {
            image: RgbaImage::new(ATLAS_COLUMNS * CELL_PX, ATLAS_ROWS * CELL_PX),
            degraded: Vec::new(),
        };

        atlas.fill(CELL_DIGIT_ZERO, text_glyph("0", 0x00ffff, CELL_PX, 6));
        atlas.fill(CELL_DIGIT_ONE, text_glyph("1", 0xff00ff, CELL_PX, 6));
        atlas.fill(CELL_EMBER, radial_gradient(CELL_PX, &EMBER_STOPS));
        atlas.fill(CELL_AURA, radial_gradient(CELL_PX, &AURA_STOPS));
        for (index, department) in DEPARTMENTS.iter().enumerate() {
            atlas.fill(
                department_cell(index),
                text_glyph(department.code, department.color, CELL_PX, 8),
            );
        }

        atlas
    }

    fn fill(&mut self, cell: usize, raster: Result<RgbaImage, RasterError>) {
        let result = raster.and_then(|image| self.blit(cell, &image));
        if let Err(err) = result {
            log::warn!("atlas cell {} left blank: {}", cell, err);
            self.degraded.push(cell);
        }
    }

    /// Copies `raster` into `cell`, cropping anything beyond the cell size.
    pub fn blit(&mut self, cell: usize, raster: &RgbaImage) -> Result<(), RasterError> {
        if cell >= Self::CAPACITY {
            return Err(RasterError::CellOutOfRange {
                cell,
                capacity: Self::CAPACITY,
            });
        }
        let (origin_x, origin_y) = Self::cell_origin(cell);
        let width = raster.width().min(CELL_PX);
        let height = raster.height().min(CELL_PX);
        for y in 0..height {
            for x in 0..width {
                self.image
                    .put_pixel(origin_x + x, origin_y + y, *raster.get_pixel(x, y));
            }
        }
        Ok(())
    }

    fn cell_origin(cell: usize) -> (u32, u32) {
        let cell = cell as u32;
        ((cell % ATLAS_COLUMNS) * CELL_PX, (cell / ATLAS_COLUMNS) * CELL_PX)
    }

    /// `[u, v, width, height]` of `cell` in normalized texture coordinates,
    /// inset by half a texel to avoid bleeding from neighbours.
    pub fn uv_rect(cell: usize) -> [f32; 4] {
        let cell = cell.min(Self::CAPACITY - 1);
        let (x, y) = Self::cell_origin(cell);
        let atlas_w = (ATLAS_COLUMNS * CELL_PX) as f32;
        let atlas_h = (ATLAS_ROWS * CELL_PX) as f32;
        [
            (x as f32 + 0.5) / atlas_w,
            (y as f32 + 0.5) / atlas_h,
            (CELL_PX as f32 - 1.0) / atlas_w,
            (CELL_PX as f32 - 1.0) / atlas_h,
        ]
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Cells that fell back to blank.
    pub fn degraded_cells(&self) -> &[usize] {
        &self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_cell() {
        let atlas = SpriteAtlas::build();
        assert!(atlas.degraded_cells().is_empty());
        assert_eq!(atlas.width(), 512);
        assert_eq!(atlas.height(), 384);
        assert_eq!(atlas.rgba().len(), 512 * 384 * 4);
    }

    #[test]
    fn department_cells_follow_table_order() {
        assert_eq!(department_cell(0), 4);
        assert_eq!(department_cell(7), 11);
        assert_eq!(department_cell(8), 4);
        assert!(department_cell(7) < SpriteAtlas::CAPACITY);
    }

    #[test]
    fn uv_rects_stay_inside_their_cell() {
        let [u, v, w, h] = SpriteAtlas::uv_rect(5);
        assert!(u > 0.25 && u + w < 0.5);
        assert!(v > 1.0 / 3.0 && v + h < 2.0 / 3.0);
    }

    #[test]
    fn blit_rejects_out_of_range_cells() {
        let mut atlas = SpriteAtlas::build();
        let raster = RgbaImage::new(4, 4);
        assert_eq!(
            atlas.blit(12, &raster),
            Err(RasterError::CellOutOfRange {
                cell: 12,
                capacity: 12
            })
        );
    }
}
