//! Raster source reading cloud-optimized GeoTIFF assets by byte range

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt, TryStreamExt};
use geo::{Centroid, Polygon};
use tracing::{debug, instrument, warn};

use crate::catalog::{CatalogItem, ItemSet, RasterBand};
use crate::config::LoaderConfig;
use crate::error::{Error, Result};
use crate::formats::tiff::reader::ParallelDecoder;
use crate::formats::tiff::CogHeader;
use crate::io::{ByteSource, HttpByteSource};
use crate::projection::Transformer;

use super::grid::Grid;
use super::solar_day::group_by_solar_day;
use super::{BandRequest, RasterSource, RasterShape, RawRaster};

/// Tiles to read from one scene, with the `(grid cell, in-tile pixel)`
/// pairs each tile provides
#[derive(Debug, Default)]
struct SamplePlan {
    tiles: BTreeMap<usize, Vec<(usize, usize)>>,
    covered: usize,
}

/// Maps unfilled polygon cells of `layer` onto scene pixels by nearest
/// neighbour
fn plan_samples(header: &CogHeader, grid: &Grid, layer: &[f64]) -> Result<SamplePlan> {
    let transformer = Transformer::new(grid.epsg(), header.geo.require_epsg()?)?;
    let image = header.locator.image();
    let mut plan = SamplePlan::default();

    for cell in grid.masked_cells().filter(|&c| layer[c].is_nan()) {
        let Ok(scene) = transformer.transform(grid.cell_center(cell)) else {
            continue;
        };
        let Some((px, py)) = header.geo.geo_to_pixel(scene) else {
            continue;
        };
        let (px, py) = (px.floor(), py.floor());
        if px < 0.0 || py < 0.0 || px >= image.width as f64 || py >= image.height as f64 {
            continue;
        }

        let (x, y) = (px as u64, py as u64);
        let tile = header.locator.tile_index(x, y)?;
        plan.tiles
            .entry(tile)
            .or_default()
            .push((cell, header.locator.pixel_index(x, y)));
        plan.covered += 1;
    }

    Ok(plan)
}

fn is_nodata(value: f64, nodata: Option<f64>) -> bool {
    match nodata {
        _ if value.is_nan() => true,
        Some(n) if n.is_nan() => false,
        Some(n) => value == n,
        None => false,
    }
}

/// Runs CPU-bound work off the async worker threads
async fn run_blocking<T, F>(task: &str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Load(format!("{} task failed: {}", task, e)))?
}

fn asset_href<'a>(item: &'a CatalogItem, key: &str) -> Result<&'a str> {
    item.asset(key)
        .map(|a| a.href.as_str())
        .ok_or_else(|| Error::Load(format!("Item {} has no asset '{}'", item.id, key)))
}

/// Loads bands from COG assets onto the grid of the first item's first band
pub struct CogRasterSource {
    source: Arc<dyn ByteSource>,
    config: LoaderConfig,
}

impl CogRasterSource {
    pub fn new(source: Arc<dyn ByteSource>, config: LoaderConfig) -> Self {
        Self { source, config }
    }

    /// Source reading assets over HTTP range requests
    pub fn http(config: LoaderConfig) -> Result<Self> {
        let source = HttpByteSource::new(config.request_timeout)?;
        Ok(Self::new(Arc::new(source), config))
    }

    /// Fetches and parses the header, growing the fetched prefix while the
    /// IFD references bytes past its end
    async fn read_header(&self, href: &str) -> Result<CogHeader> {
        let mut length = self.config.header_bytes.max(16);
        loop {
            let data = self.source.read_range(href, 0, length).await?;
            let whole_file = (data.len() as u64) < length;

            match CogHeader::parse(data) {
                Err(Error::Io(e))
                    if e.kind() == ErrorKind::UnexpectedEof
                        && !whole_file
                        && length < self.config.max_header_bytes =>
                {
                    length = (length * 2).min(self.config.max_header_bytes);
                    debug!(href, length, "Header exceeds fetched prefix");
                }
                Err(Error::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(Error::InvalidFormat(format!(
                        "Header of {} does not fit in {} bytes: {}",
                        href, length, e
                    )));
                }
                other => return other,
            }
        }
    }

    /// Copies valid pixels of one scene into the still-missing cells of
    /// `layer`; returns the number of cells the scene covers
    async fn sample_scene(
        &self,
        href: &str,
        header: &Arc<CogHeader>,
        grid: &Arc<Grid>,
        nodata: Option<f64>,
        layer: &mut [f64],
    ) -> Result<usize> {
        let plan = {
            let (header, grid, snapshot) = (Arc::clone(header), Arc::clone(grid), layer.to_vec());
            run_blocking("Sample planning", move || plan_samples(&header, &grid, &snapshot)).await?
        };
        if plan.tiles.is_empty() {
            return Ok(plan.covered);
        }

        let ranges = plan
            .tiles
            .keys()
            .map(|&tile| header.tile_range(tile).map(|(offset, length)| (tile, offset, length)))
            .collect::<Result<Vec<_>>>()?;

        let fetched: Vec<(usize, Bytes)> = stream::iter(ranges)
            .map(|(tile, offset, length)| async move {
                if length == 0 {
                    return Ok((tile, Bytes::new()));
                }
                let data = self.source.read_range(href, offset, length).await?;
                if (data.len() as u64) < length {
                    return Err(Error::InvalidFormat(format!(
                        "Tile {} truncated: {} of {} bytes",
                        tile,
                        data.len(),
                        length
                    )));
                }
                Ok((tile, data))
            })
            .buffer_unordered(self.config.fetch_concurrency.max(1))
            .try_collect()
            .await?;
        debug!(href, tiles = fetched.len(), "Fetched tiles");

        let decoder = header.decoder()?;
        let decoded =
            run_blocking("Tile decoding", move || ParallelDecoder::decode_tiles(&decoder, fetched)).await?;

        let nodata = nodata.or(header.nodata);
        for (tile, samples) in &plan.tiles {
            let Some(values) = decoded.get(tile) else {
                continue;
            };
            for &(cell, pixel) in samples {
                match values.get(pixel) {
                    Some(&v) if !is_nodata(v, nodata) => layer[cell] = v,
                    _ => {}
                }
            }
        }

        Ok(plan.covered)
    }
}

#[async_trait]
impl RasterSource for CogRasterSource {
    #[instrument(skip_all, fields(items = items.len()))]
    async fn load_raw(
        &self,
        items: &ItemSet,
        polygon: &Polygon<f64>,
        bands: &[BandRequest],
    ) -> Result<RawRaster> {
        let first = items
            .first()
            .ok_or_else(|| Error::Load("No items to load".to_string()))?;
        let reference_band = bands
            .first()
            .ok_or_else(|| Error::Load("No bands requested".to_string()))?;

        let mut headers: HashMap<&str, Arc<CogHeader>> = HashMap::new();
        let reference_href = asset_href(first, &reference_band.asset)?;
        let reference = Arc::new(self.read_header(reference_href).await?);
        let grid = {
            let (area, geo, max_pixels) = (polygon.clone(), reference.geo.clone(), self.config.max_pixels);
            Arc::new(run_blocking("Grid construction", move || Grid::from_polygon(&area, &geo, max_pixels)).await?)
        };
        headers.insert(reference_href, reference);
        debug!(
            epsg = grid.epsg(),
            width = grid.width(),
            height = grid.height(),
            "Output grid"
        );

        let fallback_longitude = polygon.centroid().map(|p| p.x()).unwrap_or(0.0);
        let groups = group_by_solar_day(items, fallback_longitude)?;
        let shape = RasterShape::new(groups.len(), grid.height(), grid.width());
        let mut raw = RawRaster::new(shape, groups.iter().map(|g| g.day).collect());

        let mut covered = 0;
        for request in bands {
            let mut values = vec![f64::NAN; shape.len()];

            for (layer, group) in values.chunks_mut(grid.len()).zip(&groups) {
                for item in &group.items {
                    let Some(asset) = item.asset(&request.asset) else {
                        warn!(item = %item.id, asset = %request.asset, "Item lacks band asset");
                        continue;
                    };
                    let href = asset.href.as_str();
                    if !headers.contains_key(href) {
                        let header = self.read_header(href).await?;
                        headers.insert(href, Arc::new(header));
                    }
                    let Some(header) = headers.get(href) else {
                        continue;
                    };

                    let nodata = item
                        .raster_band(&request.asset)
                        .and_then(RasterBand::nodata_value);
                    covered += self
                        .sample_scene(href, header, &grid, nodata, layer)
                        .await?;
                }
            }

            raw.insert_band(request.band, values)?;
        }

        if covered == 0 {
            return Err(Error::Load("Polygon does not overlap any scene".to_string()));
        }
        Ok(raw)
    }
}
