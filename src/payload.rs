//! Shared Payload Module
//!
//! Tagged value for the case where one cache instance must hold several kinds
//! of payload under a single key space. Prefer one typed cache per value type;
//! reach for [`Payload`] only when a shared cache is unavoidable.

use crate::cache::{Bitmap, Blob, EstimateSize};

// == Payload ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Blob),
    Image(Bitmap),
    List(Vec<Payload>),
}

impl Payload {
    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Binary(_) => "binary",
            Payload::Image(_) => "image",
            Payload::List(_) => "list",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Blob> {
        match self {
            Payload::Binary(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Bitmap> {
        match self {
            Payload::Image(bitmap) => Some(bitmap),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Payload]> {
        match self {
            Payload::List(items) => Some(items),
            _ => None,
        }
    }

    /// Consumes the payload, yielding the list items if it is a list.
    pub fn into_list(self) -> Option<Vec<Payload>> {
        match self {
            Payload::List(items) => Some(items),
            _ => None,
        }
    }
}

impl EstimateSize for Payload {
    fn estimated_size(&self) -> u64 {
        match self {
            Payload::Text(text) => text.estimated_size(),
            Payload::Binary(blob) => blob.estimated_size(),
            Payload::Image(bitmap) => bitmap.estimated_size(),
            Payload::List(items) => items.estimated_size(),
        }
    }

    fn element_estimate(&self) -> u64 {
        match self {
            Payload::Text(text) => text.element_estimate(),
            Payload::Binary(blob) => blob.element_estimate(),
            Payload::Image(bitmap) => bitmap.element_estimate(),
            Payload::List(items) => items.element_estimate(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Blob> for Payload {
    fn from(blob: Blob) -> Self {
        Payload::Binary(blob)
    }
}

impl From<Bitmap> for Payload {
    fn from(bitmap: Bitmap) -> Self {
        Payload::Image(bitmap)
    }
}

impl<T: Into<Payload>> From<Vec<T>> for Payload {
    fn from(items: Vec<T>) -> Self {
        Payload::List(items.into_iter().map(Into::into).collect())
    }
}
