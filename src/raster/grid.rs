//! Output pixel grid for a polygon

use geo::{BoundingRect, Contains, Intersects, MapCoords, Point, Polygon, Rect};

use crate::error::{Error, Result};
use crate::formats::tiff::GeoInfo;
use crate::projection::{epsg, Coordinate, Transformer};

/// North-up grid aligned to a scene's pixel lattice, covering the bounding
/// box of a polygon
///
/// Cells whose centers fall outside the polygon are excluded by the mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    epsg: u16,
    origin_x: f64,
    origin_y: f64,
    pixel_width: f64,
    pixel_height: f64,
    width: usize,
    height: usize,
    mask: Vec<bool>,
}

impl Grid {
    /// Builds the grid for a WGS84 `polygon` in the CRS and resolution of
    /// `reference`
    pub fn from_polygon(polygon: &Polygon<f64>, reference: &GeoInfo, max_pixels: usize) -> Result<Self> {
        let crs = reference.require_epsg()?;
        let t = reference
            .affine_transform()
            .ok_or_else(|| Error::InvalidFormat("Missing geotransform".to_string()))?;
        if t[2] != 0.0 || t[4] != 0.0 || t[1] <= 0.0 || t[5] >= 0.0 {
            return Err(Error::Unsupported(format!("Geotransform {:?} is not north-up", t)));
        }
        let (pixel_width, pixel_height) = (t[1], -t[5]);

        let transformer = Transformer::new(epsg::WGS84, crs)?;
        let projected: Polygon<f64> = polygon
            .try_map_coords(|c| transformer.transform(c.into()).map(Into::into))?;

        let bounds = projected
            .bounding_rect()
            .ok_or_else(|| Error::Load("Polygon has no extent".to_string()))?;

        let col_start = ((bounds.min().x - t[0]) / pixel_width).floor();
        let col_end = ((bounds.max().x - t[0]) / pixel_width).ceil();
        let row_start = ((t[3] - bounds.max().y) / pixel_height).floor();
        let row_end = ((t[3] - bounds.min().y) / pixel_height).ceil();

        let width = ((col_end - col_start) as usize).max(1);
        let height = ((row_end - row_start) as usize).max(1);
        if width.saturating_mul(height) > max_pixels {
            return Err(Error::Load(format!(
                "Polygon spans {}x{} pixels, limit is {}",
                width, height, max_pixels
            )));
        }

        let mut grid = Self {
            epsg: crs,
            origin_x: t[0] + col_start * pixel_width,
            origin_y: t[3] - row_start * pixel_height,
            pixel_width,
            pixel_height,
            width,
            height,
            mask: Vec::new(),
        };
        grid.mask = grid.rasterize(&projected)?;
        Ok(grid)
    }

    /// Center-in-polygon mask; polygons thinner than a pixel keep every cell
    /// they touch
    fn rasterize(&self, projected: &Polygon<f64>) -> Result<Vec<bool>> {
        let centers: Vec<bool> = (0..self.len())
            .map(|i| {
                let c = self.cell_center(i);
                projected.contains(&Point::new(c.x, c.y))
            })
            .collect();
        if centers.iter().any(|&inside| inside) {
            return Ok(centers);
        }

        let touched: Vec<bool> = (0..self.len())
            .map(|i| projected.intersects(&self.cell_rect(i)))
            .collect();
        if touched.iter().any(|&inside| inside) {
            Ok(touched)
        } else {
            Err(Error::Load("Polygon does not cover any pixel".to_string()))
        }
    }

    pub fn epsg(&self) -> u16 {
        self.epsg
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cells per time step
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upper-left corner of the grid
    pub fn origin(&self) -> Coordinate {
        Coordinate::new(self.origin_x, self.origin_y)
    }

    /// Center of the cell at row-major `index`, in grid CRS
    pub fn cell_center(&self, index: usize) -> Coordinate {
        let (col, row) = (index % self.width, index / self.width);
        Coordinate::new(
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y - (row as f64 + 0.5) * self.pixel_height,
        )
    }

    fn cell_rect(&self, index: usize) -> Rect<f64> {
        let c = self.cell_center(index);
        let (hw, hh) = (self.pixel_width / 2.0, self.pixel_height / 2.0);
        Rect::new((c.x - hw, c.y - hh), (c.x + hw, c.y + hh))
    }

    pub fn in_polygon(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    /// Row-major indices of the cells inside the polygon
    pub fn masked_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, &inside)| inside.then_some(i))
    }
}
