#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use meridian::decoded_image::DecodedImage;
use meridian::delivery::TileSource;
use meridian::meridian_types::{Crs, Point2, Polygon, Rect, Size};
use meridian::pyramid::{InMemoryCatalog, Mosaic, Pyramid, TileIndex, TileInput, TileReference};
use meridian::render::Paint;
use meridian::{Canvas, Color, MeridianError, Messenger};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Canvas with one pixel per world unit, `x_min` at the left edge and `y_max` at the top.
pub struct PixelCanvas {
    origin: Point2,
    size: Size,
    pixels: Vec<Color>,
    background: Color,
}

impl PixelCanvas {
    pub fn new(world: Rect, background: Color) -> Self {
        let size = Size::new(world.width() as u32, world.height() as u32);
        Self {
            origin: Point2::new(world.x_min, world.y_max),
            size,
            pixels: vec![background; size.area() as usize],
            background,
        }
    }

    pub fn width(&self) -> u32 {
        self.size.width()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.size.width() + x) as usize]
    }

    /// Columns of the given row that are not of the background color.
    pub fn painted_columns(&self, y: u32) -> Vec<u32> {
        (0..self.size.width())
            .filter(|x| self.pixel(*x, y) != self.background)
            .collect()
    }

    fn fill(&mut self, color: Color, inside: impl Fn(&Point2) -> bool) {
        for y in 0..self.size.height() {
            for x in 0..self.size.width() {
                let center = Point2::new(
                    self.origin.x + x as f64 + 0.5,
                    self.origin.y - y as f64 - 0.5,
                );
                if inside(&center) {
                    self.pixels[(y * self.size.width() + x) as usize] = color;
                }
            }
        }
    }
}

impl Canvas for PixelCanvas {
    fn paint_tile(&mut self, tile: &TileReference) -> Result<(), MeridianError> {
        let color = match tile.input() {
            TileInput::Decoded(image) => {
                let [r, g, b, a] = <[u8; 4]>::try_from(&image.bytes()[0..4])
                    .map_err(|_| MeridianError::Paint("empty image".into()))?;
                Color::rgba(r, g, b, a)
            }
            TileInput::Lazy(_) => return Err(MeridianError::Paint("tile is not decoded".into())),
        };

        let bbox = *tile.bbox();
        self.fill(color, |p| bbox.contains(p));
        Ok(())
    }

    fn paint_polygon(&mut self, polygon: &Polygon, paint: Paint) -> Result<(), MeridianError> {
        self.fill(paint.color, |p| polygon.contains(p));
        Ok(())
    }
}

/// Canvas that remembers what was painted on it.
#[derive(Default)]
pub struct RecordingCanvas {
    pub tiles: Vec<(String, TileIndex, Rect)>,
    pub polygons: Vec<Rect>,
    pub failing: HashSet<TileIndex>,
}

impl Canvas for RecordingCanvas {
    fn paint_tile(&mut self, tile: &TileReference) -> Result<(), MeridianError> {
        if self.failing.contains(&tile.index()) {
            return Err(MeridianError::Paint(format!("cannot paint {:?}", tile.index())));
        }

        self.tiles
            .push((tile.mosaic_id().to_string(), tile.index(), *tile.bbox()));
        Ok(())
    }

    fn paint_polygon(&mut self, polygon: &Polygon, _paint: Paint) -> Result<(), MeridianError> {
        self.polygons.extend(polygon.bounding_rect());
        Ok(())
    }
}

/// Tile source producing single color tiles of any mosaic.
#[derive(Default)]
pub struct GridSource {
    pub loads: AtomicUsize,
    pub delay: Duration,
    pub failing: HashSet<TileIndex>,
}

impl GridSource {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileSource for GridSource {
    async fn load_tile(
        &self,
        mosaic: &Mosaic,
        index: TileIndex,
    ) -> Result<TileReference, MeridianError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.contains(&index) {
            return Err(MeridianError::Decoding(format!("corrupted tile {index:?}")));
        }

        let bbox = mosaic.tile_bbox(index).ok_or(MeridianError::NotFound)?;
        let image = DecodedImage::from_raw(Color::GREEN.to_u8_array().to_vec(), Size::new(1, 1))?;
        Ok(TileReference::new(
            mosaic.id(),
            index,
            bbox,
            TileInput::Decoded(Arc::new(image)),
        ))
    }
}

/// Counts redraw requests.
#[derive(Default)]
pub struct CountingMessenger {
    pub redraws: AtomicUsize,
}

impl Messenger for CountingMessenger {
    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }
}

/// Geographic pyramid with a single mosaic of `cols x rows` tiles covering the whole world.
pub fn world_pyramid(cols: u32, rows: u32) -> Pyramid {
    let tile_size = Size::new(256, 256);
    let scale = 360.0 / (cols as f64 * 256.0);
    let mosaic = Mosaic::new(
        format!("world_{cols}x{rows}"),
        Point2::new(-180.0, 90.0),
        Size::new(cols, rows),
        tile_size,
        scale,
    )
    .expect("valid mosaic");

    Pyramid::new("world", Crs::EPSG4326, vec![mosaic]).expect("valid pyramid")
}

/// Planar pyramid with mosaics of exact scales `1, 2, 4 ...`, tiles of 256 pixels.
pub fn planar_pyramid(crs: Crs, grid: u32, levels: u32) -> Pyramid {
    let mosaics = (0..levels)
        .map(|level| {
            let factor = 1u32 << level;
            Mosaic::new(
                format!("level_{level}"),
                Point2::new(0.0, grid as f64 * 256.0),
                Size::new(grid / factor, grid / factor),
                Size::new(256, 256),
                factor as f64,
            )
            .expect("valid mosaic")
        })
        .collect();

    Pyramid::new("planar", crs, mosaics).expect("valid pyramid")
}

pub fn catalog_with(source: &str, pyramid: Pyramid) -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();
    catalog.insert(source, pyramid);
    Arc::new(catalog)
}
