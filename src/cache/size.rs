//! Size Estimation Module
//!
//! Heuristic byte-cost estimates used for budget accounting. These are
//! approximations, never measured allocations, and every estimate is cheap:
//! collections sample their first element instead of walking everything.

use std::collections::VecDeque;
use std::sync::Arc;

// == Public Constants ==
/// Estimate for values the cache knows nothing about
pub const OPAQUE_SIZE_ESTIMATE: u64 = 256;

/// Per-element estimate for non-text elements of a sampled collection
pub const ELEMENT_SIZE_ESTIMATE: u64 = 64;

/// Pluggable size policy handed to a cache at construction.
pub type SizeEstimator<V> = Arc<dyn Fn(&V) -> u64 + Send + Sync>;

/// Returns the estimator backed by the value type's [`EstimateSize`] impl.
pub fn default_estimator<V: EstimateSize>() -> SizeEstimator<V> {
    Arc::new(|value: &V| value.estimated_size())
}

// == Estimate Size ==
/// Approximate memory footprint of a cached value.
///
/// Both methods have defaults, so an empty `impl EstimateSize for MyType {}`
/// opts a type in as an opaque value of [`OPAQUE_SIZE_ESTIMATE`] bytes.
pub trait EstimateSize {
    /// Estimated bytes for this value stored on its own.
    fn estimated_size(&self) -> u64 {
        OPAQUE_SIZE_ESTIMATE
    }

    /// Per-element cost used when this value is the sampled first element
    /// of a collection.
    fn element_estimate(&self) -> u64 {
        ELEMENT_SIZE_ESTIMATE
    }
}

/// `8 * n + 32` for the references, plus `n` times the sampled element cost.
fn collection_estimate<T: EstimateSize + ?Sized>(len: usize, first: Option<&T>) -> u64 {
    let len = len as u64;
    let base = len * 8 + 32;
    match first {
        Some(first) => base + first.element_estimate() * len,
        None => base,
    }
}

// == Text ==
impl EstimateSize for str {
    fn estimated_size(&self) -> u64 {
        self.encode_utf16().count() as u64 * 2 + 24
    }

    fn element_estimate(&self) -> u64 {
        self.encode_utf16().count() as u64 * 2
    }
}

impl EstimateSize for String {
    fn estimated_size(&self) -> u64 {
        self.as_str().estimated_size()
    }

    fn element_estimate(&self) -> u64 {
        self.as_str().element_estimate()
    }
}

// == Binary ==
/// Opaque byte payload, estimated as its length plus a small header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl EstimateSize for Blob {
    fn estimated_size(&self) -> u64 {
        self.0.len() as u64 + 16
    }
}

// == Image ==
/// Decoded ARGB8888 image: one `u32` per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Arc<[u32]>,
}

impl Bitmap {
    /// Creates a fully transparent bitmap.
    pub fn blank(width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![0u32; count].into(),
        }
    }

    /// Wraps existing pixel data. Returns None if the buffer length does not
    /// match `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl EstimateSize for Bitmap {
    fn estimated_size(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * 4 + 32
    }
}

// == Collections ==
impl<T: EstimateSize> EstimateSize for Vec<T> {
    fn estimated_size(&self) -> u64 {
        collection_estimate(self.len(), self.first())
    }
}

impl<T: EstimateSize> EstimateSize for VecDeque<T> {
    fn estimated_size(&self) -> u64 {
        collection_estimate(self.len(), self.front())
    }
}

// == Smart Pointers ==
impl<T: EstimateSize + ?Sized> EstimateSize for Arc<T> {
    fn estimated_size(&self) -> u64 {
        (**self).estimated_size()
    }

    fn element_estimate(&self) -> u64 {
        (**self).element_estimate()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Box<T> {
    fn estimated_size(&self) -> u64 {
        (**self).estimated_size()
    }

    fn element_estimate(&self) -> u64 {
        (**self).element_estimate()
    }
}
