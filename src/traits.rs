use crate::errors::Result;

/// Foreground/background segmentation as an opaque capability.
///
/// Input is raw encoded image bytes in any common format; output is encoded
/// image bytes decodable to an image whose alpha channel marks foreground
/// pixels as opaque and background pixels as transparent. The crop pipeline
/// depends only on this trait, so tests run against a stub returning
/// synthetic masks instead of a model.
pub trait Segmenter: Send + Sync {
    fn segment(&self, bytes: &[u8]) -> Result<Vec<u8>>;
}
