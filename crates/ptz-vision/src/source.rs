//! Frame sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{VisionError, VisionResult};
use crate::frame::{fit_resolution, Frame};

/// A video source producing frames on demand.
///
/// `next_frame` blocks (asynchronously) until a frame is available. Any
/// error is terminal for the tracking loop.
#[async_trait]
pub trait FrameSource: Send {
    /// Acquire the next frame.
    async fn next_frame(&mut self) -> VisionResult<Frame>;

    /// Release device handles. Called once at shutdown.
    fn release(&mut self) {}

    /// Source name for logging.
    fn name(&self) -> &str;
}

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Frames read from image files in a directory, in file-name order.
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    cursor: usize,
    looping: bool,
    resolution: Option<(u32, u32)>,
}

impl ImageSequenceSource {
    /// Scan `dir` for image files.
    pub fn open(dir: impl AsRef<Path>) -> VisionResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(VisionError::EmptySource(dir));
        }

        info!("Image sequence source: {} frames in {}", files.len(), dir.display());

        Ok(Self {
            dir,
            files,
            cursor: 0,
            looping: false,
            resolution: None,
        })
    }

    /// Restart from the first file after the last one.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Resize every frame to this resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    /// Number of files in the sequence.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl FrameSource for ImageSequenceSource {
    async fn next_frame(&mut self) -> VisionResult<Frame> {
        if self.cursor >= self.files.len() {
            if !self.looping {
                return Err(VisionError::SourceExhausted);
            }
            self.cursor = 0;
        }

        let path = self.files[self.cursor].clone();
        self.cursor += 1;
        debug!("Reading frame {}", path.display());

        let decoded = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| VisionError::internal(format!("frame decode task: {e}")))?
            .map_err(|e| VisionError::frame_acquisition(e.to_string()))?;

        let frame = decoded.to_rgb8();
        Ok(match self.resolution {
            Some((width, height)) => fit_resolution(frame, width, height),
            None => frame,
        })
    }

    fn name(&self) -> &str {
        self.dir.to_str().unwrap_or("image-sequence")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn write_frames(dir: &Path, count: u8) {
        for i in 0..count {
            let frame = Frame::from_pixel(8, 6, Rgb([i * 40, 0, 0]));
            frame.save(dir.join(format!("frame_{i:03}.png"))).unwrap();
        }
        std::fs::write(dir.join("notes.txt"), "not a frame").unwrap();
    }

    #[tokio::test]
    async fn test_reads_in_order_then_exhausts() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 3);

        let mut source = ImageSequenceSource::open(dir.path()).unwrap();
        assert_eq!(source.len(), 3);
        for i in 0..3u8 {
            let frame = source.next_frame().await.unwrap();
            assert_eq!(frame.get_pixel(0, 0), &Rgb([i * 40, 0, 0]));
        }
        assert!(matches!(
            source.next_frame().await,
            Err(VisionError::SourceExhausted)
        ));
    }

    #[tokio::test]
    async fn test_looping_and_resolution() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 2);

        let mut source = ImageSequenceSource::open(dir.path())
            .unwrap()
            .looping(true)
            .with_resolution(16, 12);
        for _ in 0..5 {
            let frame = source.next_frame().await.unwrap();
            assert_eq!(frame.dimensions(), (16, 12));
        }
    }

    #[test]
    fn test_empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageSequenceSource::open(dir.path());
        assert!(matches!(result, Err(VisionError::EmptySource(_))));
        assert!(result.err().map(|e| e.is_acquisition_failure()).unwrap_or(false));
    }
}
