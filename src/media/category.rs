//! Media type classification for trackvault.
//!
//! Uploaded files are bucketed into coarse categories from their MIME type
//! once, at upload time. Call sites that accept drops declare which
//! categories they take via [`CategorySet`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse media category of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    /// Audio tracks (audio/*).
    Audio,
    /// Images (image/*).
    Image,
    /// Video clips (video/*).
    Video,
    /// PDF documents.
    Document,
    /// Everything else.
    #[default]
    Other,
}

impl MediaCategory {
    /// Convert category to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Audio => "audio",
            MediaCategory::Image => "image",
            MediaCategory::Video => "video",
            MediaCategory::Document => "document",
            MediaCategory::Other => "other",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" => Ok(MediaCategory::Audio),
            "image" => Ok(MediaCategory::Image),
            "video" => Ok(MediaCategory::Video),
            "document" => Ok(MediaCategory::Document),
            "other" => Ok(MediaCategory::Other),
            _ => Err(format!("unknown media category: {s}")),
        }
    }
}

// For #[sqlx(try_from = "String")] on row structs.
impl TryFrom<String> for MediaCategory {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Classify a MIME type into a media category.
///
/// Checks in priority order: audio, image, video, then PDF. A MIME type
/// matching none of these is `Other`.
pub fn classify_mime(mime: &str) -> MediaCategory {
    let mime = mime.trim().to_ascii_lowercase();
    if mime.starts_with("audio/") {
        MediaCategory::Audio
    } else if mime.starts_with("image/") {
        MediaCategory::Image
    } else if mime.starts_with("video/") {
        MediaCategory::Video
    } else if mime.contains("pdf") {
        MediaCategory::Document
    } else {
        MediaCategory::Other
    }
}

/// Short format label for a file name, derived from its extension.
///
/// Known extensions map to a canonical label (`mp3` -> `MP3`, `jpeg` ->
/// `JPEG`). An unknown extension is uppercased as-is; a name without any
/// extension yields `"Unknown"`.
pub fn extension_label(filename: &str) -> String {
    let ext = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => return "Unknown".to_string(),
    };

    match ext.as_str() {
        "mp3" => "MP3".to_string(),
        "wav" => "WAV".to_string(),
        "flac" => "FLAC".to_string(),
        "aac" => "AAC".to_string(),
        "ogg" => "OGG".to_string(),
        "m4a" => "M4A".to_string(),
        "jpg" | "jpeg" => "JPEG".to_string(),
        "png" => "PNG".to_string(),
        "gif" => "GIF".to_string(),
        "webp" => "WEBP".to_string(),
        "svg" => "SVG".to_string(),
        "mp4" => "MP4".to_string(),
        "mov" => "MOV".to_string(),
        "webm" => "WEBM".to_string(),
        "pdf" => "PDF".to_string(),
        "zip" => "ZIP".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

/// The set of media categories a drop surface accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    accepted: Vec<MediaCategory>,
}

impl CategorySet {
    /// Build a set from explicit categories.
    pub fn new(accepted: impl Into<Vec<MediaCategory>>) -> Self {
        Self {
            accepted: accepted.into(),
        }
    }

    /// Audio-only surface (track uploaders).
    pub fn audio_only() -> Self {
        Self::new([MediaCategory::Audio])
    }

    /// The studio library surface: audio, images, video and PDFs.
    pub fn studio_media() -> Self {
        Self::new([
            MediaCategory::Audio,
            MediaCategory::Image,
            MediaCategory::Video,
            MediaCategory::Document,
        ])
    }

    /// Whether the set accepts the given category.
    pub fn accepts(&self, category: MediaCategory) -> bool {
        self.accepted.contains(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_audio() {
        assert_eq!(classify_mime("audio/mpeg"), MediaCategory::Audio);
        assert_eq!(classify_mime("audio/wav"), MediaCategory::Audio);
        assert_eq!(classify_mime("AUDIO/FLAC"), MediaCategory::Audio);
    }

    #[test]
    fn test_classify_image() {
        assert_eq!(classify_mime("image/png"), MediaCategory::Image);
        assert_eq!(classify_mime("image/svg+xml"), MediaCategory::Image);
    }

    #[test]
    fn test_classify_video() {
        assert_eq!(classify_mime("video/mp4"), MediaCategory::Video);
    }

    #[test]
    fn test_classify_pdf() {
        assert_eq!(classify_mime("application/pdf"), MediaCategory::Document);
        assert_eq!(classify_mime("application/x-pdf"), MediaCategory::Document);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify_mime("application/zip"), MediaCategory::Other);
        assert_eq!(classify_mime("text/plain"), MediaCategory::Other);
        assert_eq!(classify_mime(""), MediaCategory::Other);
    }

    #[test]
    fn test_category_roundtrip() {
        for category in [
            MediaCategory::Audio,
            MediaCategory::Image,
            MediaCategory::Video,
            MediaCategory::Document,
            MediaCategory::Other,
        ] {
            assert_eq!(category.as_str().parse::<MediaCategory>(), Ok(category));
        }
    }

    #[test]
    fn test_category_from_str_invalid() {
        assert!("spreadsheet".parse::<MediaCategory>().is_err());
    }

    #[test]
    fn test_extension_label_known() {
        assert_eq!(extension_label("demo.mp3"), "MP3");
        assert_eq!(extension_label("cover.jpeg"), "JPEG");
        assert_eq!(extension_label("cover.JPG"), "JPEG");
        assert_eq!(extension_label("notes.pdf"), "PDF");
    }

    #[test]
    fn test_extension_label_unknown_extension() {
        assert_eq!(extension_label("session.xyz"), "XYZ");
        assert_eq!(extension_label("archive.tar.zst"), "ZST");
    }

    #[test]
    fn test_extension_label_no_extension() {
        assert_eq!(extension_label("README"), "Unknown");
        assert_eq!(extension_label(""), "Unknown");
        assert_eq!(extension_label(".gitignore"), "Unknown");
    }

    #[test]
    fn test_category_set_audio_only() {
        let set = CategorySet::audio_only();
        assert!(set.accepts(MediaCategory::Audio));
        assert!(!set.accepts(MediaCategory::Image));
        assert!(!set.accepts(MediaCategory::Document));
    }

    #[test]
    fn test_category_set_studio_media() {
        let set = CategorySet::studio_media();
        assert!(set.accepts(MediaCategory::Audio));
        assert!(set.accepts(MediaCategory::Image));
        assert!(set.accepts(MediaCategory::Video));
        assert!(set.accepts(MediaCategory::Document));
        assert!(!set.accepts(MediaCategory::Other));
    }
}
