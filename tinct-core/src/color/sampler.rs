//! Accent extraction from decoded artwork.
//!
//! The sampler votes quantized colors into a 4096-bucket histogram after
//! dropping transparent, near-black, washed-out and skin-like pixels. Bright,
//! low-contrast artwork that leaves no clear winner falls back to scoring
//! buckets by colorfulness, and finally to a fixed neutral.

use image::RgbaImage;
use tinct_model::Rgb;

use crate::constants::sampler::*;

/// Borrowed RGBA8 pixel rows.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> PixelView<'a> {
    /// Wrap raw RGBA8 rows of `stride` bytes. Returns `None` when the buffer
    /// is too short for the stated geometry.
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Option<Self> {
        let row_bytes = width as usize * 4;
        if stride < row_bytes {
            return None;
        }
        let needed = match height {
            0 => 0,
            h => stride * (h as usize - 1) + row_bytes,
        };
        (data.len() >= needed).then_some(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn from_rgba(image: &'a RgbaImage) -> Self {
        Self {
            data: image.as_raw(),
            width: image.width(),
            height: image.height(),
            stride: image.width() as usize * 4,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let at = y as usize * self.stride + x as usize * 4;
        [
            self.data[at],
            self.data[at + 1],
            self.data[at + 2],
            self.data[at + 3],
        ]
    }
}

/// 4 bits per channel, 4096 buckets.
#[derive(Debug, Clone)]
pub struct Histogram {
    counts: Box<[u32; Histogram::BUCKETS]>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            counts: Box::new([0; Histogram::BUCKETS]),
        }
    }
}

impl Histogram {
    pub const BUCKETS: usize = 4096;

    #[inline]
    pub fn bucket_of(color: Rgb) -> usize {
        (usize::from(color.r >> 4) << 8)
            | (usize::from(color.g >> 4) << 4)
            | usize::from(color.b >> 4)
    }

    /// Center of a bucket: `q * 16 + 8` per channel.
    pub fn bin_center(bucket: usize) -> Rgb {
        let channel = |q: usize| ((q & 0xF) * 16 + 8) as u8;
        Rgb::new(channel(bucket >> 8), channel(bucket >> 4), channel(bucket))
    }

    pub fn add(&mut self, color: Rgb) {
        self.counts[Self::bucket_of(color)] += 1;
    }

    pub fn add_bucket(&mut self, bucket: usize, count: u32) {
        self.counts[bucket] += count;
    }

    pub fn count(&self, bucket: usize) -> u32 {
        self.counts[bucket]
    }

    /// Most voted bucket and its count. Ties go to the lowest bucket index.
    pub fn peak(&self) -> Option<(usize, u32)> {
        let mut best: Option<(usize, u32)> = None;
        for (bucket, &count) in self.counts.iter().enumerate() {
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((bucket, count));
            }
        }
        best
    }

    /// Bucket maximizing `chroma(center) * ln(1 + count)`.
    pub fn most_colorful(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (bucket, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let chroma = f64::from(Self::bin_center(bucket).chroma());
            let score = chroma * (1.0 + f64::from(count)).ln();
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((bucket, score));
            }
        }
        best.map(|(bucket, _)| bucket)
    }
}

/// Everything one pass over the central window learns about an image.
#[derive(Debug, Clone, Default)]
pub struct SampleStats {
    /// Pixels that were neither transparent nor near-black.
    pub considered: u32,
    pub bright: u32,
    /// Saturated pixels, skin tones included.
    pub colorful: u32,
    /// Saturated, non-skin votes.
    pub votes: Histogram,
    /// Saturated votes with skin tones let back in.
    pub relaxed: Histogram,
}

impl SampleStats {
    pub fn scan(view: &PixelView<'_>) -> Self {
        let mut stats = SampleStats::default();
        let (x0, x1) = window(view.width);
        let (y0, y1) = window(view.height);

        for y in (y0..y1).step_by(STEP) {
            for x in (x0..x1).step_by(STEP) {
                let [r, g, b, a] = view.pixel(x, y);
                stats.observe(Rgb::new(r, g, b), a);
            }
        }
        stats
    }

    fn observe(&mut self, color: Rgb, alpha: u8) {
        if alpha < MIN_ALPHA {
            return;
        }
        let luminance = color.luminance();
        if luminance < DARK_LUMINANCE {
            return;
        }

        self.considered += 1;
        if luminance > BRIGHT_LUMINANCE {
            self.bright += 1;
        }

        let saturation = color.saturation();
        if saturation < MIN_SATURATION {
            return;
        }

        self.colorful += 1;
        self.relaxed.add(color);
        if !is_skin_tone(color, saturation, luminance) {
            self.votes.add(color);
        }
    }

    fn noise_floor(&self) -> u32 {
        MIN_PEAK.max(self.considered / PEAK_DIVISOR)
    }

    fn ratio(&self, count: u32) -> f64 {
        f64::from(count) / f64::from(self.considered)
    }

    /// Resolve the accent from the gathered statistics.
    pub fn accent(&self) -> Rgb {
        if self.considered == 0 {
            return NEUTRAL_DARK;
        }

        let peak = self.votes.peak();
        if let Some((bucket, count)) = peak
            && count >= self.noise_floor()
        {
            return Histogram::bin_center(bucket);
        }

        if self.ratio(self.bright) >= MOSTLY_BRIGHT_RATIO {
            if self.ratio(self.colorful) < MIN_COLORFUL_RATIO {
                return NEUTRAL_LIGHT;
            }
            return self
                .relaxed
                .most_colorful()
                .map_or(NEUTRAL_LIGHT, Histogram::bin_center);
        }

        peak.map_or(NEUTRAL_DARK, |(bucket, _)| Histogram::bin_center(bucket))
    }
}

fn window(extent: u32) -> (u32, u32) {
    let start = (u64::from(extent) * u64::from(WINDOW_START) / 100) as u32;
    let end = (u64::from(extent) * u64::from(WINDOW_END) / 100) as u32;
    (start, end)
}

fn is_skin_tone(color: Rgb, saturation: f64, luminance: f64) -> bool {
    let hue = color.hue();
    (SKIN_HUE_MIN..=SKIN_HUE_MAX).contains(&hue)
        && (SKIN_SATURATION_MIN..=SKIN_SATURATION_MAX).contains(&saturation)
        && (SKIN_LUMINANCE_MIN..=SKIN_LUMINANCE_MAX).contains(&luminance)
}

/// Extract the dominant vivid color of an image.
pub fn sample(view: &PixelView<'_>) -> Rgb {
    SampleStats::scan(view).accent()
}
