//! Waveform rasterizer.
//!
//! Draws one trace per channel into a caller-owned pixel buffer. Each
//! frame starts a private draw accumulator at the channel's tick
//! position and steps it by `draw_delta` per column, so the trace can run
//! ahead of the authoritative position without disturbing it.
//!
//! The inner column loop is monomorphized over sample word, loop kind,
//! kernel and line style; nothing in it branches on format or loop mode.

use alloc::vec::Vec;

use scope_ir::{Interpolation, LoopMode, SampleData, ScopeStyle};

use crate::channel::{wrap_overrun, ChannelState, LoopGeometry};
use crate::frequency::{FRAC_BITS, FRAC_MASK, FRAC_ONE};
use crate::interpolation::{CubicKernel, CubicTable, Kernel, LinearKernel, NearestKernel, TapSource};

/// Pixels between neighbouring scopes laid out by [`scope_regions`].
pub const SCOPE_GUTTER: u32 = 1;

/// Scope volume is 0-255; full volume spans the region's half-height.
const VOLUME_BITS: u32 = 8;
const SAMPLE_BITS: u32 = 15;

/// A flat pixel buffer with a row stride.
pub struct RasterSurface<'a> {
    pixels: &'a mut [u32],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> RasterSurface<'a> {
    /// Wrap `pixels`. Width is limited to the stride and height to the
    /// rows that fit in the buffer.
    pub fn new(pixels: &'a mut [u32], width: usize, height: usize, stride: usize) -> Self {
        let stride = stride.max(1);
        let width = width.min(stride);
        let rows_available = if pixels.len() >= width {
            (pixels.len() - width) / stride + 1
        } else {
            0
        };
        Self {
            pixels,
            width,
            height: height.min(rows_available),
            stride,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at (x, y), if inside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.stride + x])
    }

    /// Write a pixel, skipping it if outside the surface.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.stride + x as usize] = color;
        }
    }

    /// Fill the part of `clip` that lies on the surface.
    fn fill(&mut self, clip: &Clip, color: u32) {
        if clip.is_empty() {
            return;
        }
        for y in clip.y0..clip.y1 {
            let row = y as usize * self.stride;
            self.pixels[row + clip.x0 as usize..row + clip.x1 as usize].fill(color);
        }
    }

    fn clip(&self, region: &ScopeRegion) -> Clip {
        let x0 = region.x.clamp(0, self.width as i32);
        let y0 = region.y.clamp(0, self.height as i32);
        let x1 = (region.x as i64 + region.w as i64).min(self.width as i64) as i32;
        let y1 = (region.y as i64 + region.h as i64).min(self.height as i64) as i32;
        Clip {
            x0,
            y0,
            x1: x1.max(x0),
            y1: y1.max(y0),
        }
    }
}

/// Screen rectangle given to one channel's scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScopeRegion {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl ScopeRegion {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Row the trace is centred on.
    pub fn line_y(&self) -> i32 {
        self.y.saturating_add((self.h / 2) as i32)
    }

    /// Largest offset from [`line_y`](Self::line_y) that stays inside the region.
    pub fn half_height(&self) -> u32 {
        self.h.saturating_sub(1) / 2
    }
}

/// Region ∩ surface, half-open.
#[derive(Clone, Copy, Debug)]
struct Clip {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl Clip {
    fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

#[inline]
fn plot(surface: &mut RasterSurface, clip: &Clip, x: i32, y: i32, color: u32) {
    if clip.contains(x, y) {
        surface.put_pixel(x, y, color);
    }
}

/// Bresenham segment from (x0, y0) to (x1, y1), clipped per pixel.
///
/// Adjacent scope columns are one pixel apart horizontally, so segments
/// are almost always y-major: one pixel per row covered.
fn draw_line(surface: &mut RasterSurface, clip: &Clip, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        plot(surface, clip, x as i32, y as i32, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Vertical pixel offset of a 16-bit value at a scope volume.
#[inline]
pub fn amplitude(value: i32, volume: u8, half_height: u32) -> i32 {
    ((value as i64 * volume as i64 * half_height as i64) >> (SAMPLE_BITS + VOLUME_BITS)) as i32
}

/// A stored sample word.
pub trait SampleWord: Copy {
    /// Value in 16-bit range.
    fn widen(self) -> i32;
}

impl SampleWord for i8 {
    #[inline]
    fn widen(self) -> i32 {
        (self as i32) << 8
    }
}

impl SampleWord for i16 {
    #[inline]
    fn widen(self) -> i32 {
        self as i32
    }
}

/// How taps outside the playing region map back into the data.
pub trait LoopKind {
    const MODE: LoopMode;

    /// Data index for `index`, or `None` for silence.
    fn resolve(index: i64, geom: &LoopGeometry, has_looped: bool) -> Option<i64>;
}

/// Play once; reads past the end are silent.
pub struct NoLoop;
/// Taps past the loop end continue from the loop start.
pub struct ForwardLoop;
/// Taps past either loop boundary reflect back into the loop.
pub struct PingPongLoop;

impl LoopKind for NoLoop {
    const MODE: LoopMode = LoopMode::Off;

    #[inline]
    fn resolve(index: i64, geom: &LoopGeometry, _has_looped: bool) -> Option<i64> {
        (index < geom.sample_end as i64).then_some(index.max(0))
    }
}

impl LoopKind for ForwardLoop {
    const MODE: LoopMode = LoopMode::Forward;

    #[inline]
    fn resolve(index: i64, geom: &LoopGeometry, has_looped: bool) -> Option<i64> {
        let start = geom.loop_start as i64;
        let end = geom.sample_end as i64;
        let len = (geom.loop_length as i64).max(1);
        let i = if index >= end {
            start + (index - end) % len
        } else if has_looped && index < start {
            end - (start - index).min(len)
        } else {
            index
        };
        Some(i.max(0))
    }
}

impl LoopKind for PingPongLoop {
    const MODE: LoopMode = LoopMode::Bidirectional;

    #[inline]
    fn resolve(index: i64, geom: &LoopGeometry, has_looped: bool) -> Option<i64> {
        let start = geom.loop_start as i64;
        let end = geom.sample_end as i64;
        let i = if index >= end {
            (2 * end - 1 - index).max(start)
        } else if has_looped && index < start {
            (2 * start - 1 - index).min(end - 1)
        } else {
            index
        };
        Some(i.max(0))
    }
}

/// Tap reader over one sample buffer.
struct Taps<'a, S, L> {
    data: &'a [S],
    geom: LoopGeometry,
    has_looped: bool,
    _kind: core::marker::PhantomData<L>,
}

impl<S: SampleWord, L: LoopKind> TapSource for Taps<'_, S, L> {
    #[inline]
    fn tap(&self, index: i64) -> i32 {
        match L::resolve(index, &self.geom, self.has_looped) {
            Some(i) => self.data.get(i as usize).map_or(0, |s| s.widen()),
            None => 0,
        }
    }
}

/// Draw accumulator, a private copy of the channel's position.
#[derive(Clone, Copy, Debug)]
struct DrawCursor {
    pos: u64,
    frac: u64,
    backwards: bool,
    has_looped: bool,
    playing: bool,
}

impl DrawCursor {
    fn from_channel(ch: &ChannelState) -> Self {
        Self {
            pos: ch.position as u64,
            frac: ch.position_frac,
            backwards: ch.sampling_backwards,
            has_looped: ch.has_looped,
            playing: true,
        }
    }

    /// Interpolated value under the cursor.
    #[inline]
    fn read<S: SampleWord, L: LoopKind, K: Kernel>(&self, data: &[S], geom: &LoopGeometry, kernel: &K) -> i32 {
        let taps = Taps::<S, L> {
            data,
            geom: *geom,
            has_looped: self.has_looped,
            _kind: core::marker::PhantomData,
        };
        if L::MODE == LoopMode::Bidirectional && self.backwards {
            // Mirror into the loop; the fraction now runs towards lower indices.
            let actual = (geom.sample_end as i64 - 1) - (self.pos as i64 - geom.loop_start as i64);
            if self.frac == 0 {
                kernel.interpolate(&taps, actual, 0)
            } else {
                kernel.interpolate(&taps, actual - 1, FRAC_ONE - self.frac)
            }
        } else {
            kernel.interpolate(&taps, self.pos as i64, self.frac)
        }
    }

    #[inline]
    fn advance<L: LoopKind>(&mut self, delta: u64, geom: &LoopGeometry) {
        self.frac += delta;
        self.pos += self.frac >> FRAC_BITS;
        self.frac &= FRAC_MASK;
        if self.pos >= geom.sample_end as u64 {
            match wrap_overrun(L::MODE, self.pos, geom, &mut self.backwards) {
                Some(p) => {
                    self.pos = p as u64;
                    self.has_looped = true;
                }
                None => self.playing = false,
            }
        }
    }
}

/// Draw one channel's trace across its region.
#[allow(clippy::too_many_arguments)]
fn draw_trace<S: SampleWord, L: LoopKind, K: Kernel, const LINED: bool>(
    surface: &mut RasterSurface,
    clip: &Clip,
    region: &ScopeRegion,
    data: &[S],
    ch: &ChannelState,
    kernel: &K,
    color: u32,
) {
    let geom = ch.geometry();
    let half = region.half_height();
    let line_y = region.line_y();
    let mut cursor = DrawCursor::from_channel(ch);
    let mut prev_y: Option<i32> = None;

    for col in 0..region.w {
        let x = region.x.saturating_add(col.min(i32::MAX as u32) as i32);
        // Past the right edge nothing more is visible.
        if x > clip.x1 {
            break;
        }
        let value = if cursor.playing {
            cursor.read::<S, L, K>(data, &geom, kernel)
        } else {
            0
        };
        // Held one row outside the clip so segments stay short on tall regions.
        let y = line_y
            .saturating_sub(amplitude(value, ch.volume, half))
            .clamp(clip.y0 - 1, clip.y1);

        if LINED {
            match prev_y {
                Some(py) => draw_line(surface, clip, x.saturating_sub(1), py, x, y, color),
                None => plot(surface, clip, x, y, color),
            }
            prev_y = Some(y);
        } else {
            plot(surface, clip, x, y, color);
        }

        if cursor.playing {
            cursor.advance::<L>(ch.draw_delta, &geom);
        }
    }
}

/// Select the monomorphized trace routine for (style, format, loop mode).
#[allow(clippy::too_many_arguments)]
fn dispatch<K: Kernel>(
    surface: &mut RasterSurface,
    clip: &Clip,
    region: &ScopeRegion,
    sample: &SampleData,
    ch: &ChannelState,
    lined: bool,
    kernel: &K,
    color: u32,
) {
    use LoopMode::{Bidirectional, Forward, Off};
    use SampleData::{Pcm16, Pcm8};

    match (lined, sample, ch.loop_mode) {
        (false, Pcm8(d), Off) => draw_trace::<i8, NoLoop, K, false>(surface, clip, region, d, ch, kernel, color),
        (false, Pcm8(d), Forward) => draw_trace::<i8, ForwardLoop, K, false>(surface, clip, region, d, ch, kernel, color),
        (false, Pcm8(d), Bidirectional) => draw_trace::<i8, PingPongLoop, K, false>(surface, clip, region, d, ch, kernel, color),
        (false, Pcm16(d), Off) => draw_trace::<i16, NoLoop, K, false>(surface, clip, region, d, ch, kernel, color),
        (false, Pcm16(d), Forward) => draw_trace::<i16, ForwardLoop, K, false>(surface, clip, region, d, ch, kernel, color),
        (false, Pcm16(d), Bidirectional) => draw_trace::<i16, PingPongLoop, K, false>(surface, clip, region, d, ch, kernel, color),
        (true, Pcm8(d), Off) => draw_trace::<i8, NoLoop, K, true>(surface, clip, region, d, ch, kernel, color),
        (true, Pcm8(d), Forward) => draw_trace::<i8, ForwardLoop, K, true>(surface, clip, region, d, ch, kernel, color),
        (true, Pcm8(d), Bidirectional) => draw_trace::<i8, PingPongLoop, K, true>(surface, clip, region, d, ch, kernel, color),
        (true, Pcm16(d), Off) => draw_trace::<i16, NoLoop, K, true>(surface, clip, region, d, ch, kernel, color),
        (true, Pcm16(d), Forward) => draw_trace::<i16, ForwardLoop, K, true>(surface, clip, region, d, ch, kernel, color),
        (true, Pcm16(d), Bidirectional) => draw_trace::<i16, PingPongLoop, K, true>(surface, clip, region, d, ch, kernel, color),
    }
}

/// Draws channel scopes with one set of display settings.
#[derive(Clone, Copy)]
pub struct ScopePainter<'a> {
    pub table: &'a CubicTable,
    pub interpolation: Interpolation,
    pub lined: bool,
    pub style: ScopeStyle,
}

impl ScopePainter<'_> {
    /// Paint one channel's scope.
    ///
    /// Active channels are cleared and redrawn every call. Idle or muted
    /// channels blank their region once and are skipped afterwards.
    pub fn paint(&self, surface: &mut RasterSurface, region: &ScopeRegion, ch: &mut ChannelState, muted: bool) {
        let clip = surface.clip(region);

        if !ch.active || muted || ch.sample.is_none() {
            if !ch.was_cleared {
                surface.fill(&clip, self.style.background);
                ch.was_cleared = true;
            }
            return;
        }

        ch.was_cleared = false;
        surface.fill(&clip, self.style.background);
        if clip.is_empty() {
            return;
        }

        let ch: &ChannelState = ch;
        let Some(sample) = ch.sample.as_deref() else {
            return;
        };
        let color = self.style.foreground;
        match self.interpolation {
            Interpolation::Nearest => dispatch(surface, &clip, region, sample, ch, self.lined, &NearestKernel, color),
            Interpolation::Linear => dispatch(surface, &clip, region, sample, ch, self.lined, &LinearKernel, color),
            Interpolation::Cubic => {
                let kernel = CubicKernel::new(self.table);
                dispatch(surface, &clip, region, sample, ch, self.lined, &kernel, color)
            }
        }
    }
}

/// Lay out `channel_count` scopes inside `area`: one row for up to four
/// channels, otherwise two rows of `channel_count / 2`.
pub fn scope_regions(channel_count: usize, area: ScopeRegion) -> Vec<ScopeRegion> {
    if channel_count == 0 {
        return Vec::new();
    }
    let rows: u32 = if channel_count <= 4 { 1 } else { 2 };
    let per_row = (channel_count as u32).div_ceil(rows);

    let w = area.w.saturating_sub((per_row - 1) * SCOPE_GUTTER) / per_row;
    let h = area.h.saturating_sub((rows - 1) * SCOPE_GUTTER) / rows;

    (0..channel_count as u32)
        .map(|i| {
            let row = i / per_row;
            let col = i % per_row;
            ScopeRegion {
                x: area.x + (col * (w + SCOPE_GUTTER)) as i32,
                y: area.y + (row * (h + SCOPE_GUTTER)) as i32,
                w,
                h,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::INTERP_PHASES;
    use alloc::sync::Arc;
    use alloc::vec;
    use scope_ir::SyncTrigger;

    const W: usize = 64;
    const H: usize = 32;
    const FG: u32 = 0xFFFF_FFFF;
    const BG: u32 = 0xFF00_0000;
    const REGION: ScopeRegion = ScopeRegion::new(0, 0, W as u32, H as u32);

    fn painter(table: &CubicTable, interpolation: Interpolation, lined: bool) -> ScopePainter<'_> {
        ScopePainter {
            table,
            interpolation,
            lined,
            style: ScopeStyle {
                foreground: FG,
                background: BG,
            },
        }
    }

    fn channel(data: SampleData, mode: LoopMode, loop_start: u32, loop_length: u32) -> ChannelState {
        let mut ch = ChannelState::new();
        assert!(ch.trigger(&SyncTrigger::looped(Arc::new(data), mode, loop_start, loop_length)));
        ch.volume = 255;
        ch.draw_delta = FRAC_ONE;
        ch
    }

    /// Foreground rows per column.
    fn lit_rows(pixels: &[u32], x: usize) -> Vec<usize> {
        (0..H).filter(|&y| pixels[y * W + x] == FG).collect()
    }

    #[test]
    fn surface_clips_out_of_range_pixels() {
        let mut pixels = vec![0u32; 4 * 4];
        let mut surface = RasterSurface::new(&mut pixels, 4, 4, 4);
        surface.put_pixel(-1, 0, 1);
        surface.put_pixel(4, 0, 1);
        surface.put_pixel(0, 4, 1);
        surface.put_pixel(3, 3, 7);
        assert_eq!(surface.pixel(3, 3), Some(7));
        assert_eq!(pixels.iter().filter(|&&p| p != 0).count(), 1);
    }

    #[test]
    fn surface_height_limited_to_buffer() {
        let mut pixels = vec![0u32; 10];
        let surface = RasterSurface::new(&mut pixels, 4, 8, 4);
        assert_eq!(surface.height(), 2);
    }

    #[test]
    fn bresenham_steep_segment_is_connected() {
        let mut pixels = vec![0u32; 4 * 16];
        let mut surface = RasterSurface::new(&mut pixels, 4, 16, 4);
        let clip = surface.clip(&ScopeRegion::new(0, 0, 4, 16));
        draw_line(&mut surface, &clip, 0, 2, 1, 12, 1);
        let lit: Vec<(usize, usize)> = (0..16)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .filter(|&(x, y)| pixels[y * 4 + x] == 1)
            .collect();
        assert_eq!(lit.len(), 11);
        for y in 2..=12 {
            assert!(lit.iter().any(|&(_, ly)| ly == y), "row {} missing", y);
        }
    }

    #[test]
    fn amplitude_spans_half_height() {
        assert_eq!(amplitude(0, 255, 16), 0);
        assert_eq!(amplitude(32767, 0, 16), 0);
        assert_eq!(amplitude(-32768, 255, 16), -16);
        assert_eq!(amplitude(16384, 255, 32), 15);
    }

    #[test]
    fn dotted_constant_trace_is_flat() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let mut ch = channel(SampleData::Pcm16(vec![16384; 256]), LoopMode::Off, 0, 0);
        let mut pixels = vec![0u32; W * H];
        let mut surface = RasterSurface::new(&mut pixels, W, H, W);

        painter(&table, Interpolation::Cubic, false).paint(&mut surface, &REGION, &mut ch, false);

        let expected = (REGION.line_y() - amplitude(16384, 255, REGION.half_height())) as usize;
        for x in 1..W {
            assert_eq!(lit_rows(&pixels, x), vec![expected], "column {}", x);
        }
    }

    #[test]
    fn eight_and_sixteen_bit_draw_alike() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let bytes: Vec<i8> = (0..200).map(|i| ((i * 7) % 200 - 100) as i8).collect();
        let words: Vec<i16> = bytes.iter().map(|&b| (b as i16) << 8).collect();

        let mut a = channel(SampleData::Pcm8(bytes), LoopMode::Forward, 50, 150);
        let mut b = channel(SampleData::Pcm16(words), LoopMode::Forward, 50, 150);
        let mut pa = vec![0u32; W * H];
        let mut pb = vec![0u32; W * H];
        let p = painter(&table, Interpolation::Linear, true);
        p.paint(&mut RasterSurface::new(&mut pa, W, H, W), &REGION, &mut a, false);
        p.paint(&mut RasterSurface::new(&mut pb, W, H, W), &REGION, &mut b, false);
        assert_eq!(pa, pb);
    }

    #[test]
    fn lined_trace_covers_every_column() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let square: Vec<i8> = (0..128).map(|i| if (i / 4) % 2 == 0 { 127 } else { -128 }).collect();
        let mut ch = channel(SampleData::Pcm8(square), LoopMode::Forward, 0, 128);
        let mut pixels = vec![0u32; W * H];
        let mut surface = RasterSurface::new(&mut pixels, W, H, W);

        painter(&table, Interpolation::Nearest, true).paint(&mut surface, &REGION, &mut ch, false);

        for x in 0..W {
            assert!(!lit_rows(&pixels, x).is_empty(), "column {} empty", x);
        }
        // Edges of the square wave are joined by vertical runs.
        assert!(lit_rows(&pixels, 4).len() > 8);
    }

    #[test]
    fn drawing_leaves_channel_position_alone() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let mut ch = channel(SampleData::Pcm8(vec![10; 40]), LoopMode::Bidirectional, 10, 30);
        ch.position = 20;
        let mut pixels = vec![0u32; W * H];
        let mut surface = RasterSurface::new(&mut pixels, W, H, W);
        painter(&table, Interpolation::Cubic, true).paint(&mut surface, &REGION, &mut ch, false);
        assert_eq!(ch.position, 20);
        assert!(!ch.sampling_backwards);
        assert!(!ch.has_looped);
    }

    #[test]
    fn backwards_reads_are_mirrored() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let ramp: Vec<i16> = (0..100).map(|i| i * 300).collect();
        let mut ch = channel(SampleData::Pcm16(ramp), LoopMode::Bidirectional, 50, 50);
        ch.position = 50;
        ch.sampling_backwards = true;
        ch.has_looped = true;
        ch.draw_delta = 0;

        let mut pixels = vec![0u32; W * H];
        let mut surface = RasterSurface::new(&mut pixels, W, H, W);
        painter(&table, Interpolation::Nearest, false).paint(&mut surface, &REGION, &mut ch, false);

        // Position 50 going backwards reads sample 99.
        let expected = (REGION.line_y() - amplitude(99 * 300, 255, REGION.half_height())) as usize;
        assert_eq!(lit_rows(&pixels, 0), vec![expected]);
    }

    #[test]
    fn one_shot_flatlines_after_end() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let mut ch = channel(SampleData::Pcm8(vec![127; 8]), LoopMode::Off, 0, 0);
        let mut pixels = vec![0u32; W * H];
        let mut surface = RasterSurface::new(&mut pixels, W, H, W);
        painter(&table, Interpolation::Nearest, false).paint(&mut surface, &REGION, &mut ch, false);

        let centre = REGION.line_y() as usize;
        assert_ne!(lit_rows(&pixels, 0), vec![centre]);
        assert_eq!(lit_rows(&pixels, 20), vec![centre]);
    }

    #[test]
    fn idle_channel_clears_once() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let mut ch = ChannelState::new();
        let mut pixels = vec![0x1234u32; W * H];
        let p = painter(&table, Interpolation::Cubic, true);

        p.paint(&mut RasterSurface::new(&mut pixels, W, H, W), &REGION, &mut ch, false);
        assert!(pixels.iter().all(|&px| px == BG));
        assert!(ch.was_cleared);

        pixels[5] = 0x1234;
        p.paint(&mut RasterSurface::new(&mut pixels, W, H, W), &REGION, &mut ch, false);
        assert_eq!(pixels[5], 0x1234);
    }

    #[test]
    fn muted_channel_is_blanked() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let mut ch = channel(SampleData::Pcm8(vec![100; 64]), LoopMode::Forward, 0, 64);
        let mut pixels = vec![0u32; W * H];
        painter(&table, Interpolation::Cubic, true).paint(
            &mut RasterSurface::new(&mut pixels, W, H, W),
            &REGION,
            &mut ch,
            true,
        );
        assert!(pixels.iter().all(|&px| px == BG));
        assert!(ch.active);
    }

    #[test]
    fn region_hanging_off_surface_is_clipped() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let saw: Vec<i8> = (0..=255u8).map(|b| b as i8).collect();
        let mut ch = channel(SampleData::Pcm8(saw), LoopMode::Forward, 0, 256);
        let mut pixels = vec![0u32; W * H];
        let region = ScopeRegion::new(-20, 10, 100, 40);
        painter(&table, Interpolation::Linear, true).paint(
            &mut RasterSurface::new(&mut pixels, W, H, W),
            &region,
            &mut ch,
            false,
        );
        // Rows above the region stay untouched.
        assert!(pixels[..10 * W].iter().all(|&px| px == 0));
        assert!(pixels[10 * W..].iter().any(|&px| px == FG));
    }

    #[test]
    fn region_beyond_surface_edges_draws_nothing() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let p = painter(&table, Interpolation::Cubic, true);
        let mut pixels = vec![0u32; W * H];
        let outside = [
            ScopeRegion::new(100, 0, 10, 32),
            ScopeRegion::new(0, 40, 64, 16),
            ScopeRegion::new(W as i32, H as i32, 8, 8),
            ScopeRegion::new(i32::MAX - 4, i32::MAX - 4, u32::MAX, u32::MAX),
        ];

        for region in &outside {
            let mut idle = ChannelState::new();
            p.paint(&mut RasterSurface::new(&mut pixels, W, H, W), region, &mut idle, false);
            assert!(idle.was_cleared);

            let mut active = channel(SampleData::Pcm8(vec![90; 64]), LoopMode::Forward, 0, 64);
            p.paint(&mut RasterSurface::new(&mut pixels, W, H, W), region, &mut active, false);
        }
        assert!(pixels.iter().all(|&px| px == 0));
    }

    #[test]
    fn oversized_region_is_clipped_to_surface() {
        let table = CubicTable::build(INTERP_PHASES).unwrap();
        let mut ch = channel(SampleData::Pcm16(vec![0; 64]), LoopMode::Forward, 0, 64);
        let mut pixels = vec![0u32; W * H];
        let region = ScopeRegion::new(-100, -100, u32::MAX, 232);
        painter(&table, Interpolation::Nearest, true).paint(
            &mut RasterSurface::new(&mut pixels, W, H, W),
            &region,
            &mut ch,
            false,
        );
        assert!(pixels.iter().all(|&px| px == BG || px == FG));
        assert!(pixels.contains(&FG));
    }

    #[test]
    fn regions_split_into_rows() {
        let area = ScopeRegion::new(0, 0, 399, 81);
        let four = scope_regions(4, area);
        assert_eq!(four.len(), 4);
        assert!(four.iter().all(|r| r.y == 0 && r.h == 81));
        assert_eq!(four[1].x, 100);

        let eight = scope_regions(8, area);
        assert_eq!(eight.len(), 8);
        assert_eq!(eight[4].y, 41);
        assert_eq!(eight[4].x, 0);
        assert!(eight.iter().all(|r| r.h == 40 && r.w == 99));
    }
}
