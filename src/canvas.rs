//! CPU raster drawing surface.
//!
//! The surface is a fixed-size opaque RGBA buffer. Strokes are rasterized
//! directly into it by stamping filled discs along each segment, which is
//! what a round-capped 2D-context line amounts to at these brush sizes.
//! Every completed edit pushes a full-surface snapshot onto the history
//! stack; undo/redo repaint the surface from the snapshot at the cursor.

use image::{imageops, Rgba, RgbaImage};

use crate::history::{HistoryStack, RasterSnapshot, SnapshotKind};

pub const SURFACE_WIDTH: u32 = 800;
pub const SURFACE_HEIGHT: u32 = 600;

pub const MIN_STROKE_WIDTH: f32 = 1.0;
pub const MAX_STROKE_WIDTH: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawTool {
    Pen,
    Eraser,
}

/// Current tool settings. Mutated only by toolbar actions.
#[derive(Clone, Copy, Debug)]
pub struct DrawToolState {
    pub tool: DrawTool,
    pub stroke_color: [u8; 3],
    pub background_color: [u8; 3],
    pub stroke_width: f32,
}

impl Default for DrawToolState {
    fn default() -> Self {
        Self {
            tool: DrawTool::Pen,
            stroke_color: [0, 0, 0],
            background_color: [255, 255, 255],
            stroke_width: 2.0,
        }
    }
}

pub struct CanvasState {
    surface: RgbaImage,
    pub tool_state: DrawToolState,
    pub history: HistoryStack,
    /// Point the active stroke last touched; `None` when no stroke is open.
    active_stroke_last: Option<(f32, f32)>,
    /// Set whenever the surface pixels change; the renderer clears it after
    /// re-uploading the texture.
    dirty: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasState {
    pub fn new() -> Self {
        let tool_state = DrawToolState::default();
        let surface = RgbaImage::from_pixel(
            SURFACE_WIDTH,
            SURFACE_HEIGHT,
            opaque(tool_state.background_color),
        );
        Self {
            surface,
            tool_state,
            history: HistoryStack::new(),
            active_stroke_last: None,
            dirty: true,
        }
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn stroke_active(&self) -> bool {
        self.active_stroke_last.is_some()
    }

    /// Color the active tool paints with: the eraser paints background.
    fn active_color(&self) -> Rgba<u8> {
        match self.tool_state.tool {
            DrawTool::Pen => opaque(self.tool_state.stroke_color),
            DrawTool::Eraser => opaque(self.tool_state.background_color),
        }
    }

    /// Open a stroke at `point` and stamp its first cap.
    pub fn begin_stroke(&mut self, point: (f32, f32)) {
        let color = self.active_color();
        let radius = self.tool_state.stroke_width / 2.0;
        stamp_disc(&mut self.surface, point, radius, color);
        self.active_stroke_last = Some(point);
        self.dirty = true;
    }

    /// Draw a segment from the last point to `point`. No-op when no stroke
    /// is open.
    pub fn extend_stroke(&mut self, point: (f32, f32)) {
        let Some(last) = self.active_stroke_last else {
            return;
        };
        let color = self.active_color();
        let radius = self.tool_state.stroke_width / 2.0;
        stamp_segment(&mut self.surface, last, point, radius, color);
        self.active_stroke_last = Some(point);
        self.dirty = true;
    }

    /// Close the stroke and record a snapshot. No-op when no stroke is open.
    pub fn end_stroke(&mut self) {
        if self.active_stroke_last.take().is_none() {
            return;
        }
        self.push_snapshot(SnapshotKind::Draw);
    }

    /// Blank the surface to the background color and record a snapshot.
    pub fn clear(&mut self) {
        let bg = opaque(self.tool_state.background_color);
        for px in self.surface.pixels_mut() {
            *px = bg;
        }
        self.dirty = true;
        self.push_snapshot(SnapshotKind::Draw);
    }

    /// Decode `bytes`, scale to fit the surface preserving aspect ratio,
    /// center it, composite it over the current pixels, and snapshot.
    pub fn import_image(&mut self, bytes: &[u8]) -> Result<(), String> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| format!("Could not decode image: {}", e))?
            .into_rgba8();
        let (w, h, x, y) = fit_centered(
            decoded.width(),
            decoded.height(),
            self.width(),
            self.height(),
        );
        let scaled = imageops::resize(&decoded, w, h, imageops::FilterType::Triangle);
        imageops::overlay(&mut self.surface, &scaled, x as i64, y as i64);
        self.dirty = true;
        self.push_snapshot(SnapshotKind::Image);
        Ok(())
    }

    /// Swap the background color under existing drawn content: pixels still
    /// showing the old background take the new color, everything else stays.
    ///
    /// An identical color is a full no-op. Consecutive recolors collapse
    /// into a single history entry, since the color picker reports a change
    /// every frame of a drag and one gesture must stay one undo step.
    pub fn set_background_color(&mut self, color: [u8; 3]) {
        let old = opaque(self.tool_state.background_color);
        let new = opaque(color);
        if old == new {
            return;
        }
        for px in self.surface.pixels_mut() {
            if *px == old {
                *px = new;
            }
        }
        self.tool_state.background_color = color;
        self.dirty = true;

        let snapshot = RasterSnapshot::new(self.surface.clone(), SnapshotKind::Background);
        let coalesce = !self.history.can_redo()
            && matches!(
                self.history.current().map(|s| s.kind),
                Some(SnapshotKind::Background)
            );
        if coalesce {
            self.history.replace_current(snapshot);
        } else {
            self.history.push(snapshot);
        }
    }

    /// Step back one history entry and repaint. Silent no-op at the boundary.
    pub fn undo(&mut self) {
        if self.history.undo() {
            self.repaint_from_history();
        }
    }

    /// Step forward one history entry and repaint. Silent no-op at the boundary.
    pub fn redo(&mut self) {
        if self.history.redo() {
            self.repaint_from_history();
        }
    }

    /// Encode the surface as PNG for the upload pipeline.
    pub fn export_png(&self) -> Result<Vec<u8>, String> {
        let mut buf = Vec::new();
        let dynamic = image::DynamicImage::ImageRgba8(self.surface.clone());
        dynamic
            .write_to(
                &mut std::io::Cursor::new(&mut buf),
                image::ImageOutputFormat::Png,
            )
            .map_err(|e| format!("PNG encode failed: {}", e))?;
        Ok(buf)
    }

    fn push_snapshot(&mut self, kind: SnapshotKind) {
        self.history
            .push(RasterSnapshot::new(self.surface.clone(), kind));
    }

    fn repaint_from_history(&mut self) {
        match self.history.current() {
            Some(snapshot) => self.surface = snapshot.pixels.clone(),
            // Before the first edit: pristine white background. Background
            // recolors are themselves history entries, so the baseline is
            // always the surface the canvas started with.
            None => {
                self.surface = RgbaImage::from_pixel(
                    SURFACE_WIDTH,
                    SURFACE_HEIGHT,
                    Rgba([255, 255, 255, 255]),
                );
            }
        }
        self.dirty = true;
    }
}

fn opaque(rgb: [u8; 3]) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], 255])
}

/// Scaled size and top-left offset that fit `(iw, ih)` inside `(cw, ch)`
/// preserving aspect ratio, centered.
pub fn fit_centered(iw: u32, ih: u32, cw: u32, ch: u32) -> (u32, u32, u32, u32) {
    if iw == 0 || ih == 0 {
        return (0, 0, 0, 0);
    }
    let ratio = (cw as f64 / iw as f64).min(ch as f64 / ih as f64);
    let w = ((iw as f64 * ratio).round() as u32).max(1).min(cw);
    let h = ((ih as f64 * ratio).round() as u32).max(1).min(ch);
    (w, h, (cw - w) / 2, (ch - h) / 2)
}

/// Stamp a filled disc of `radius` centered at `center`.
fn stamp_disc(surface: &mut RgbaImage, center: (f32, f32), radius: f32, color: Rgba<u8>) {
    let r = radius.max(0.5);
    let (cx, cy) = center;
    let min_x = (cx - r).floor().max(0.0) as u32;
    let min_y = (cy - r).floor().max(0.0) as u32;
    let max_x = ((cx + r).ceil() as i64).clamp(0, surface.width() as i64) as u32;
    let max_y = ((cy + r).ceil() as i64).clamp(0, surface.height() as i64) as u32;
    let r2 = r * r;
    for y in min_y..max_y {
        for x in min_x..max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                surface.put_pixel(x, y, color);
            }
        }
    }
}

/// Stamp discs along the segment from `a` to `b` at sub-radius spacing.
fn stamp_segment(
    surface: &mut RgbaImage,
    a: (f32, f32),
    b: (f32, f32),
    radius: f32,
    color: Rgba<u8>,
) {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let dist = (dx * dx + dy * dy).sqrt();
    let step = (radius * 0.5).max(0.5);
    let steps = (dist / step).ceil() as u32;
    for i in 0..=steps {
        let t = if steps == 0 { 0.0 } else { i as f32 / steps as f32 };
        stamp_disc(surface, (a.0 + dx * t, a.1 + dy * t), radius, color);
    }
}
