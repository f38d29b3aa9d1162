use std::path::{Path, PathBuf};

use image::GenericImageView;
use tracing::{info, warn};

use crate::error::{DropError, DropResult};
use crate::services::record_file;

/// Decoded map image ready to be uploaded as a texture.
#[derive(Clone)]
pub struct DecodedImageData {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// The read-only `maps/` directory.
#[derive(Debug, Clone)]
pub struct MapLibrary {
    dir: PathBuf,
    default_map: String,
}

impl MapLibrary {
    pub fn open(dir: impl Into<PathBuf>, default_map: &str) -> DropResult<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DropError::MapsMissing(dir));
        }
        let library = Self {
            dir,
            default_map: default_map.to_string(),
        };
        if library.list_maps()?.is_empty() {
            return Err(DropError::MapsMissing(library.dir));
        }
        Ok(library)
    }

    pub fn list_maps(&self) -> DropResult<Vec<String>> {
        record_file::list_file_names(&self.dir)
    }

    /// `requested` if given, else the configured default when present,
    /// else the first map on disk.
    pub fn resolve(&self, requested: Option<&str>) -> DropResult<String> {
        if let Some(name) = requested {
            if record_file::is_plain_file_name(name) && self.dir.join(name).is_file() {
                return Ok(name.to_string());
            }
            return Err(DropError::NotFound(format!("map {name}")));
        }

        let maps = self.list_maps()?;
        if maps.iter().any(|name| *name == self.default_map) {
            return Ok(self.default_map.clone());
        }
        let first = maps
            .into_iter()
            .next()
            .ok_or_else(|| DropError::MapsMissing(self.dir.clone()))?;
        info!(
            "Default map {} not found, using {}",
            self.default_map, first
        );
        Ok(first)
    }

    pub fn path_of(&self, map_name: &str) -> PathBuf {
        self.dir.join(map_name)
    }
}

pub fn decode_map(path: &Path, max_dimension: u32) -> Option<DecodedImageData> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Failed to read map {}: {}", path.display(), err);
            return None;
        }
    };
    let mut decoded = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!("Failed to decode map {}: {}", path.display(), err);
            return None;
        }
    };
    let (width, height) = decoded.dimensions();
    if width.max(height) > max_dimension {
        decoded = decoded.resize(
            max_dimension,
            max_dimension,
            image::imageops::FilterType::Triangle,
        );
    }
    let rgba = decoded.to_rgba8();
    Some(DecodedImageData {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_or_empty_dir_is_a_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let maps = dir.path().join("maps");
        assert!(matches!(
            MapLibrary::open(&maps, "Erangel.jpg"),
            Err(DropError::MapsMissing(_))
        ));
        fs::create_dir(&maps).unwrap();
        assert!(matches!(
            MapLibrary::open(&maps, "Erangel.jpg"),
            Err(DropError::MapsMissing(_))
        ));
    }

    #[test]
    fn resolve_prefers_request_then_default_then_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Miramar.png"), b"x").unwrap();
        fs::write(dir.path().join("Vikendi.png"), b"x").unwrap();

        let library = MapLibrary::open(dir.path(), "Erangel.jpg").unwrap();
        assert_eq!(library.resolve(None).unwrap(), "Miramar.png");
        assert_eq!(library.resolve(Some("Vikendi.png")).unwrap(), "Vikendi.png");
        assert!(matches!(
            library.resolve(Some("Sanhok.png")),
            Err(DropError::NotFound(_))
        ));

        fs::write(dir.path().join("Erangel.jpg"), b"x").unwrap();
        assert_eq!(library.resolve(None).unwrap(), "Erangel.jpg");
    }

    #[test]
    fn decode_downscales_large_maps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        image::RgbaImage::from_pixel(64, 32, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let decoded = decode_map(&path, 16).unwrap();
        assert_eq!((decoded.width, decoded.height), (16, 8));
        assert_eq!(decoded.rgba.len(), 16 * 8 * 4);
        assert_eq!(&decoded.rgba[..4], &[10, 20, 30, 255]);

        fs::write(dir.path().join("bad.png"), b"not an image").unwrap();
        assert!(decode_map(&dir.path().join("bad.png"), 16).is_none());
    }
}
