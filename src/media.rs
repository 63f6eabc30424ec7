// ABOUTME: Media capture for the voice and photo modalities — file loading and MIME detection.
// ABOUTME: Produces MediaBlob values the service client transmits as multipart attachments.

use std::path::Path;

use anyhow::Context;

/// The kind of media a blob carries, as the service distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Image,
}

impl MediaKind {
    /// The multipart field name the service expects for this kind.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Image => "image",
        }
    }

    /// Placeholder transcript text shown in place of the binary payload.
    pub fn placeholder_text(&self) -> &'static str {
        match self {
            Self::Audio => "voice note sent",
            Self::Image => "photo sent",
        }
    }

    /// Fallback MIME type when the extension is unknown.
    fn default_mime(&self) -> &'static str {
        match self {
            Self::Audio => "audio/webm",
            Self::Image => "image/jpeg",
        }
    }
}

/// One captured media payload: raw bytes plus the metadata the wire needs.
#[derive(Debug, Clone)]
pub struct MediaBlob {
    pub kind: MediaKind,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

/// Detect an audio MIME type by file extension.
pub fn audio_mime(path: &Path) -> Option<&'static str> {
    match extension_of(path).as_str() {
        "webm" => Some("audio/webm"),
        "m4a" => Some("audio/mp4"),
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" => Some("audio/ogg"),
        "aac" => Some("audio/aac"),
        _ => None,
    }
}

/// Detect an image MIME type by file extension.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    match extension_of(path).as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Capture a media blob of the given kind from a file on disk.
///
/// Unknown extensions fall back to the kind's default MIME rather than
/// failing — the service sniffs content server-side.
pub fn capture_from_file(kind: MediaKind, path: &Path) -> anyhow::Result<MediaBlob> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read media file {}", path.display()))?;
    if bytes.is_empty() {
        anyhow::bail!("media file {} is empty", path.display());
    }

    let mime = match kind {
        MediaKind::Audio => audio_mime(path),
        MediaKind::Image => image_mime(path),
    }
    .unwrap_or_else(|| kind.default_mime());

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment")
        .to_string();

    Ok(MediaBlob {
        kind,
        bytes,
        mime,
        file_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_common_audio_extensions() {
        assert_eq!(audio_mime(&PathBuf::from("note.m4a")), Some("audio/mp4"));
        assert_eq!(audio_mime(&PathBuf::from("NOTE.WAV")), Some("audio/wav"));
        assert_eq!(audio_mime(&PathBuf::from("clip.webm")), Some("audio/webm"));
    }

    #[test]
    fn detects_common_image_extensions() {
        assert_eq!(image_mime(&PathBuf::from("rash.jpg")), Some("image/jpeg"));
        assert_eq!(image_mime(&PathBuf::from("rash.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(&PathBuf::from("scan.png")), Some("image/png"));
    }

    #[test]
    fn unknown_extension_yields_none() {
        assert_eq!(audio_mime(&PathBuf::from("clip.xyz")), None);
        assert_eq!(image_mime(&PathBuf::from("clip")), None);
    }

    #[test]
    fn capture_reads_bytes_and_falls_back_on_mime() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sample.unknown");
        std::fs::write(&path, b"fake media bytes").unwrap();

        let blob = capture_from_file(MediaKind::Audio, &path).unwrap();
        assert_eq!(blob.bytes, b"fake media bytes");
        assert_eq!(blob.mime, "audio/webm");
        assert_eq!(blob.file_name, "sample.unknown");
        assert_eq!(blob.kind.field_name(), "audio");
    }

    #[test]
    fn capture_rejects_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.wav");
        std::fs::write(&path, b"").unwrap();

        let result = capture_from_file(MediaKind::Audio, &path);
        assert!(result.is_err());
    }

    #[test]
    fn capture_missing_file_errors_with_path() {
        let result = capture_from_file(MediaKind::Image, &PathBuf::from("/no/such/photo.png"));
        let err = result.err().unwrap();
        assert!(err.to_string().contains("photo.png"));
    }
}
