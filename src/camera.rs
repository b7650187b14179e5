//! Camera frame sources
//!
//! Frames leave this module in RGB order at the configured resolution.
//! Live capture needs the `webcam` feature; `camera.source_dir` replays PNG
//! captures instead.

use std::path::{Path, PathBuf};

use image::imageops;

use crate::config::{CameraConfig, ChannelOrder};
use crate::error::{StartupError, StartupResult};
use crate::tracking::Frame;

pub trait FrameSource {
    /// Next frame, or `None` when none could be captured this tick
    fn read_frame(&mut self) -> Option<Frame>;

    /// Frame size in pixels
    fn resolution(&self) -> (u32, u32);

    /// Stop capturing; safe to call more than once
    fn release(&mut self);
}

/// Open the configured source: a replay directory when set, else the device
pub fn open(config: &CameraConfig) -> StartupResult<Box<dyn FrameSource>> {
    match &config.source_dir {
        Some(dir) => Ok(Box::new(ImageSequenceCamera::open(config, dir)?)),
        None => open_device(config),
    }
}

#[cfg(feature = "webcam")]
fn open_device(config: &CameraConfig) -> StartupResult<Box<dyn FrameSource>> {
    Ok(Box::new(DeviceCamera::open(config)?))
}

#[cfg(not(feature = "webcam"))]
fn open_device(config: &CameraConfig) -> StartupResult<Box<dyn FrameSource>> {
    Err(StartupError::CameraUnavailable(format!(
        "device {} requested but live capture is not compiled in \
         (enable the `webcam` feature or set camera.source_dir)",
        config.index
    )))
}

/// Scale to the configured size and apply the channel order
fn normalize(mut frame: Frame, width: u32, height: u32, order: ChannelOrder) -> Frame {
    if frame.dimensions() != (width, height) {
        frame = imageops::resize(&frame, width, height, imageops::FilterType::Triangle);
    }
    if order == ChannelOrder::Bgr {
        for px in frame.pixels_mut() {
            px.0.swap(0, 2);
        }
    }
    frame
}

/// Replays a directory of PNG captures in file-name order, looping forever
pub struct ImageSequenceCamera {
    frames: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
    channel_order: ChannelOrder,
    released: bool,
}

/// `<source_dir>/cam<index>` when present, else `source_dir` itself
fn capture_dir(source_dir: &Path, index: u32) -> PathBuf {
    let device = source_dir.join(format!("cam{index}"));
    if device.is_dir() {
        device
    } else {
        source_dir.to_path_buf()
    }
}

fn list_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

impl ImageSequenceCamera {
    pub fn open(config: &CameraConfig, source_dir: &Path) -> StartupResult<Self> {
        let dir = capture_dir(source_dir, config.index);
        let frames = list_frames(&dir).map_err(|e| {
            StartupError::CameraUnavailable(format!("cannot open {}: {e}", dir.display()))
        })?;
        if frames.is_empty() {
            return Err(StartupError::CameraUnavailable(format!(
                "no frames in {}",
                dir.display()
            )));
        }

        log::info!(
            "Camera {}: {} frame(s) from {}, {}x{}",
            config.index,
            frames.len(),
            dir.display(),
            config.width,
            config.height
        );

        Ok(Self {
            frames,
            next: 0,
            width: config.width,
            height: config.height,
            channel_order: config.channel_order,
            released: false,
        })
    }

    fn load(&self, path: &Path) -> Option<Frame> {
        match image::open(path) {
            Ok(img) => Some(normalize(
                img.to_rgb8(),
                self.width,
                self.height,
                self.channel_order,
            )),
            Err(e) => {
                log::warn!("Failed to read frame {}: {e}", path.display());
                None
            }
        }
    }
}

impl FrameSource for ImageSequenceCamera {
    fn read_frame(&mut self) -> Option<Frame> {
        if self.released {
            return None;
        }
        let path = self.frames.get(self.next)?.clone();
        self.next = (self.next + 1) % self.frames.len();
        self.load(&path)
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            log::debug!("Camera released");
        }
    }
}

#[cfg(feature = "webcam")]
mod device {
    use nokhwa::Camera;
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    };

    use super::{FrameSource, normalize};
    use crate::config::{CameraConfig, ChannelOrder};
    use crate::error::{StartupError, StartupResult};
    use crate::tracking::Frame;

    /// Live video device at `camera.index`
    pub struct DeviceCamera {
        camera: Camera,
        width: u32,
        height: u32,
        channel_order: ChannelOrder,
        released: bool,
    }

    impl DeviceCamera {
        pub fn open(config: &CameraConfig) -> StartupResult<Self> {
            let unavailable = |e: nokhwa::NokhwaError| {
                StartupError::CameraUnavailable(format!("device {}: {e}", config.index))
            };
            let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
                CameraFormat::new(
                    Resolution::new(config.width, config.height),
                    FrameFormat::MJPEG,
                    30,
                ),
            ));
            let mut camera =
                Camera::new(CameraIndex::Index(config.index), requested).map_err(unavailable)?;
            camera.open_stream().map_err(unavailable)?;

            log::info!(
                "Camera {}: live device, {}x{}",
                config.index,
                config.width,
                config.height
            );
            Ok(Self {
                camera,
                width: config.width,
                height: config.height,
                channel_order: config.channel_order,
                released: false,
            })
        }
    }

    impl FrameSource for DeviceCamera {
        fn read_frame(&mut self) -> Option<Frame> {
            if self.released {
                return None;
            }
            let decoded = match self
                .camera
                .frame()
                .and_then(|buffer| buffer.decode_image::<RgbFormat>())
            {
                Ok(decoded) => decoded,
                Err(e) => {
                    log::warn!("Camera read failed: {e}");
                    return None;
                }
            };
            let (w, h) = (decoded.width(), decoded.height());
            let frame = Frame::from_raw(w, h, decoded.into_raw())?;
            Some(normalize(frame, self.width, self.height, self.channel_order))
        }

        fn resolution(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn release(&mut self) {
            if self.released {
                return;
            }
            self.released = true;
            if let Err(e) = self.camera.stop_stream() {
                log::warn!("Failed to stop camera stream: {e}");
            }
            log::debug!("Camera released");
        }
    }
}

#[cfg(feature = "webcam")]
pub use device::DeviceCamera;
