//! Name-to-color mapping.
//!
//! Colors are a pure function of the package name, so a package keeps its color
//! across charts and redraws. `ColorCache` only memoizes the computation.

use lru::LruCache;
use std::num::NonZeroUsize;

use crate::chart::types::Rgb;

/// Fixed color of the main line (Catppuccin Mocha text).
pub const EMPHASIS_COLOR: Rgb = Rgb(205, 214, 244);

const SATURATION_LEVELS: [f64; 3] = [0.35, 0.5, 0.65];
const LIGHTNESS_LEVELS: [f64; 3] = [0.35, 0.5, 0.65];

/// Derive a stable color from a name.
pub fn color_of(name: &str) -> Rgb {
    let digest = blake3::hash(name.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    let (hue, saturation, lightness) = hsl_of(u64::from_le_bytes(head));
    hsl_to_rgb(hue, saturation, lightness)
}

/// Split a hash into hue (0..=359), saturation and lightness.
fn hsl_of(mut hash: u64) -> (f64, f64, f64) {
    let hue = (hash % 360) as f64;
    hash /= 360;
    let saturation = SATURATION_LEVELS[(hash % SATURATION_LEVELS.len() as u64) as usize];
    hash /= SATURATION_LEVELS.len() as u64;
    let lightness = LIGHTNESS_LEVELS[(hash % LIGHTNESS_LEVELS.len() as u64) as usize];
    (hue, saturation, lightness)
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgb {
    let h = hue / 360.0;
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    let channel = |offset: f64| {
        let mut t = h + offset;
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round() as u8
    };
    Rgb(channel(1.0 / 3.0), channel(0.0), channel(-1.0 / 3.0))
}

const DEFAULT_CACHE_CAPACITY: usize = 128;

/// LRU memo in front of [`color_of`].
pub struct ColorCache {
    cache: LruCache<String, Rgb>,
}

impl ColorCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, name: &str) -> Rgb {
        if let Some(color) = self.cache.get(name) {
            return *color;
        }
        let color = color_of(name);
        self.cache.put(name.to_string(), color);
        color
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
