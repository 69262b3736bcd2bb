//! Stored media: absolute URLs and image renditions
//!
//! Files are stored as paths relative to the media root. Every URL handed to
//! clients is absolute, joined from the request origin, the media prefix and
//! the stored path. Image fields additionally pick a pre-generated rendition
//! from a named key set.

use crate::config::MediaConfig;
use crate::types::ImageRendition;

/// Origin and media prefix of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUri {
    origin: String,
    media_prefix: String,
}

impl BaseUri {
    pub fn new(origin: impl Into<String>, media_prefix: impl Into<String>) -> Self {
        Self { origin: origin.into(), media_prefix: media_prefix.into() }
    }

    /// Fallback used when the request carries no usable host
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.public_base_url.clone(), config.url_prefix.clone())
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Join the request origin with a path relative to the site root
    pub fn build_absolute_uri(&self, relative: &str) -> String {
        if relative.starts_with("http://") || relative.starts_with("https://") {
            return relative.to_string();
        }
        format!(
            "{}/{}",
            self.origin.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }

    /// Absolute URL of a stored media path
    pub fn media_url(&self, stored: &str) -> String {
        if stored.starts_with("http://") || stored.starts_with("https://") {
            return stored.to_string();
        }
        let prefix = self.media_prefix.trim_matches('/');
        let stored = stored.trim_start_matches('/');
        if prefix.is_empty() {
            self.build_absolute_uri(stored)
        } else {
            self.build_absolute_uri(&format!("{}/{}", prefix, stored))
        }
    }
}

/// Named rendition sets, one per kind of image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenditionKeySet {
    CompanyLogos,
    RepresentativePhotos,
    UserAvatars,
    Images,
}

impl RenditionKeySet {
    pub fn key(&self) -> &'static str {
        match self {
            RenditionKeySet::CompanyLogos => "company_logos",
            RenditionKeySet::RepresentativePhotos => "representative_photos",
            RenditionKeySet::UserAvatars => "user_avatars",
            RenditionKeySet::Images => "images",
        }
    }

    /// Available square sizes, ascending
    pub fn sizes(&self) -> &'static [i32] {
        match self {
            RenditionKeySet::CompanyLogos => &[64, 128, 256, 512],
            RenditionKeySet::RepresentativePhotos => &[64, 128, 256],
            RenditionKeySet::UserAvatars => &[32, 64, 128, 256],
            RenditionKeySet::Images => &[128, 256, 512, 1024, 2048],
        }
    }

    /// Smallest rendition at least `requested`, else the largest one
    pub fn closest_size(&self, requested: Option<i32>) -> i32 {
        let sizes = self.sizes();
        let largest = sizes[sizes.len() - 1];
        match requested {
            None => largest,
            Some(requested) => sizes.iter().copied().find(|s| *s >= requested).unwrap_or(largest),
        }
    }
}

/// A stored file, with or without renditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFile<'a> {
    Image { path: &'a str, alt: &'a str },
    File { path: &'a str },
}

impl<'a> MediaFile<'a> {
    pub fn path(&self) -> &'a str {
        match self {
            MediaFile::Image { path, .. } | MediaFile::File { path } => path,
        }
    }

    pub fn absolute_url(&self, base: &BaseUri) -> String {
        base.media_url(self.path())
    }
}

/// Produces rendition descriptors for stored images
pub trait ImageAdjuster: Send + Sync {
    fn get_adjusted(
        &self,
        image: MediaFile<'_>,
        size: Option<i32>,
        key_set: RenditionKeySet,
        base: &BaseUri,
    ) -> ImageRendition;
}

/// Renditions laid out as `{dir}/{stem}_thumbnail_{size}.{ext}`
#[derive(Debug, Clone)]
pub struct ThumbnailAdjuster {
    thumbnail_dir: String,
}

impl ThumbnailAdjuster {
    pub fn new(thumbnail_dir: impl Into<String>) -> Self {
        Self { thumbnail_dir: thumbnail_dir.into() }
    }

    fn rendition_path(&self, path: &str, size: i32) -> String {
        let (dir, file) = match path.rsplit_once('/') {
            Some((dir, file)) => (Some(dir), file),
            None => (None, path),
        };
        let name = match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{}_thumbnail_{}.{}", stem, size, ext),
            _ => format!("{}_thumbnail_{}", file, size),
        };
        let root = self.thumbnail_dir.trim_matches('/');
        match dir {
            Some(dir) => format!("{}/{}/{}", root, dir.trim_start_matches('/'), name),
            None => format!("{}/{}", root, name),
        }
    }
}

impl ImageAdjuster for ThumbnailAdjuster {
    fn get_adjusted(
        &self,
        image: MediaFile<'_>,
        size: Option<i32>,
        key_set: RenditionKeySet,
        base: &BaseUri,
    ) -> ImageRendition {
        let size = key_set.closest_size(size);
        let alt = match image {
            MediaFile::Image { alt, .. } => alt,
            MediaFile::File { .. } => "",
        };
        ImageRendition {
            url: base.media_url(&self.rendition_path(image.path(), size)),
            alt: alt.to_string(),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseUri {
        BaseUri::new("https://directory.example.com/", "/media/")
    }

    #[test]
    fn test_media_url_is_absolute() {
        assert_eq!(
            base().media_url("brochures/acme.pdf"),
            "https://directory.example.com/media/brochures/acme.pdf"
        );
        assert_eq!(base().media_url("https://cdn.example.com/x.png"), "https://cdn.example.com/x.png");
    }

    #[test]
    fn test_closest_size_rounds_up() {
        assert_eq!(RenditionKeySet::CompanyLogos.closest_size(Some(256)), 256);
        assert_eq!(RenditionKeySet::CompanyLogos.closest_size(Some(200)), 256);
        assert_eq!(RenditionKeySet::CompanyLogos.closest_size(Some(4000)), 512);
        assert_eq!(RenditionKeySet::UserAvatars.closest_size(None), 256);
        assert_eq!(RenditionKeySet::Images.closest_size(Some(1)), 128);
    }

    #[test]
    fn test_thumbnail_rendition() {
        let adjuster = ThumbnailAdjuster::new("thumbnails");
        let logo = MediaFile::Image { path: "company_logos/acme.png", alt: "Acme logo" };
        let rendition = adjuster.get_adjusted(logo, Some(100), RenditionKeySet::CompanyLogos, &base());
        assert_eq!(
            rendition.url,
            "https://directory.example.com/media/thumbnails/company_logos/acme_thumbnail_128.png"
        );
        assert_eq!(rendition.alt, "Acme logo");
        assert_eq!(rendition.size, 128);
    }

    #[test]
    fn test_file_variant_url() {
        let video = MediaFile::File { path: "videos/tour.mp4" };
        assert_eq!(video.absolute_url(&base()), "https://directory.example.com/media/videos/tour.mp4");
    }
}
