//! OpenCV camera capture and Haar-cascade face detection.

use async_trait::async_trait;
use image::RgbImage;
use opencv::{
    core::{Mat, Rect, Scalar, Size, Vector, CV_8UC1},
    imgproc,
    objdetect::CascadeClassifier,
    prelude::*,
    videoio::{VideoCapture, CAP_ANY, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use ptz_models::PixelBox;
use tracing::{info, warn};

use crate::detector::TargetDetector;
use crate::error::{VisionError, VisionResult};
use crate::frame::Frame;
use crate::source::FrameSource;

/// Live camera capture.
pub struct CameraSource {
    index: i32,
    cap: VideoCapture,
    released: bool,
}

impl CameraSource {
    /// Open camera `index` and request the given resolution.
    pub fn open(index: i32, width: u32, height: u32) -> VisionResult<Self> {
        let mut cap = VideoCapture::new(index, CAP_ANY)
            .map_err(|e| VisionError::frame_acquisition(format!("open camera {index}: {e}")))?;

        let opened = cap
            .is_opened()
            .map_err(|e| VisionError::frame_acquisition(e.to_string()))?;
        if !opened {
            return Err(VisionError::frame_acquisition(format!(
                "camera {index} is not available"
            )));
        }

        if cap.set(CAP_PROP_FRAME_WIDTH, width as f64).is_err()
            || cap.set(CAP_PROP_FRAME_HEIGHT, height as f64).is_err()
        {
            warn!("Camera {} rejected resolution {}x{}", index, width, height);
        }

        info!("Camera {} opened at {}x{}", index, width, height);
        Ok(Self {
            index,
            cap,
            released: false,
        })
    }
}

#[async_trait]
impl FrameSource for CameraSource {
    async fn next_frame(&mut self) -> VisionResult<Frame> {
        let mut bgr = Mat::default();
        let grabbed = self
            .cap
            .read(&mut bgr)
            .map_err(|e| VisionError::frame_acquisition(e.to_string()))?;
        if !grabbed || bgr.empty() {
            return Err(VisionError::frame_acquisition(format!(
                "camera {} returned no frame",
                self.index
            )));
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB)
            .map_err(|e| VisionError::frame_acquisition(format!("color conversion: {e}")))?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let data = rgb
            .data_bytes()
            .map_err(|e| VisionError::frame_acquisition(e.to_string()))?;

        RgbImage::from_raw(width, height, data.to_vec())
            .ok_or_else(|| VisionError::frame_acquisition("frame buffer size mismatch"))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.cap.release() {
            warn!("Failed to release camera {}: {}", self.index, e);
        }
        self.released = true;
    }

    fn name(&self) -> &str {
        "camera"
    }
}

/// Frontal-face detector using an OpenCV Haar cascade.
pub struct CascadeDetector {
    classifier: CascadeClassifier,
}

impl CascadeDetector {
    /// Load a cascade XML file, e.g. `haarcascade_frontalface_default.xml`.
    pub fn load(path: &str) -> VisionResult<Self> {
        let classifier = CascadeClassifier::new(path)
            .map_err(|e| VisionError::detector_failure(format!("load cascade {path}: {e}")))?;
        if classifier.empty().unwrap_or(true) {
            return Err(VisionError::detector_failure(format!(
                "cascade {path} is empty"
            )));
        }
        Ok(Self { classifier })
    }
}

#[async_trait]
impl TargetDetector for CascadeDetector {
    async fn detect(&mut self, frame: &Frame) -> VisionResult<Vec<PixelBox>> {
        let gray_img = image::imageops::grayscale(frame);
        let (width, height) = gray_img.dimensions();

        let mut gray = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            CV_8UC1,
            Scalar::all(0.0),
        )
        .map_err(|e| VisionError::detector_failure(e.to_string()))?;
        gray.data_bytes_mut()
            .map_err(|e| VisionError::detector_failure(e.to_string()))?
            .copy_from_slice(gray_img.as_raw());

        let mut faces = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &gray,
                &mut faces,
                1.3,
                5,
                0,
                Size::new(30, 30),
                Size::new(0, 0),
            )
            .map_err(|e| VisionError::detector_failure(e.to_string()))?;

        Ok(faces
            .iter()
            .map(|r| PixelBox::new(r.x, r.y, r.width.max(0) as u32, r.height.max(0) as u32))
            .collect())
    }

    fn name(&self) -> &'static str {
        "haar-cascade"
    }
}
