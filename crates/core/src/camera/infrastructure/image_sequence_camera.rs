use std::path::{Path, PathBuf};

use crate::camera::domain::camera::{Camera, CameraError, CameraStream, StreamConstraints};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame_image::FrameImage;

/// Adapts a directory of image files to the [`Camera`] interface.
///
/// Files are sorted by name and decoded with the `image` crate, scaled to
/// the requested stream resolution. A frame is ready on every tick, so the
/// sequence behaves like a camera that always keeps up with the caller.
/// With `cycle` set the sequence restarts when it runs out; otherwise an
/// exhausted sequence reports no frame ready, like a revoked device.
pub struct ImageSequenceCamera {
    dir: PathBuf,
    cycle: bool,
}

impl ImageSequenceCamera {
    pub fn new(dir: &Path, cycle: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            cycle,
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl Camera for ImageSequenceCamera {
    fn open(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| CameraError::Unavailable(format!("{}: {e}", self.dir.display())))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_image(p))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(CameraError::Unavailable(format!(
                "no image frames in {}",
                self.dir.display()
            )));
        }

        log::info!(
            "opened image sequence: {} frames from {}",
            paths.len(),
            self.dir.display()
        );

        Ok(Box::new(ImageSequenceStream {
            paths,
            position: 0,
            index: 0,
            width: constraints.width,
            height: constraints.height,
            cycle: self.cycle,
        }))
    }
}

struct ImageSequenceStream {
    paths: Vec<PathBuf>,
    /// Next file to decode.
    position: usize,
    /// Stream-wide frame counter; keeps increasing across cycles.
    index: usize,
    width: u32,
    height: u32,
    cycle: bool,
}

impl ImageSequenceStream {
    fn decode(&self, path: &Path) -> Option<FrameImage> {
        let decoded = match image::open(path) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("skipping undecodable frame {}: {e}", path.display());
                return None;
            }
        };
        let scaled = decoded.resize_exact(
            self.width,
            self.height,
            image::imageops::FilterType::Triangle,
        );
        Some(FrameImage::new(
            scaled.to_rgb8().into_raw(),
            self.width,
            self.height,
            self.index,
        ))
    }
}

impl CameraStream for ImageSequenceStream {
    fn try_frame(&mut self) -> Option<FrameImage> {
        loop {
            if self.position >= self.paths.len() {
                if !self.cycle || self.paths.is_empty() {
                    return None;
                }
                self.position = 0;
            }
            let path = self.paths[self.position].clone();
            self.position += 1;
            if let Some(frame) = self.decode(&path) {
                self.index += 1;
                return Some(frame);
            }
        }
    }

    fn stop(&mut self) {
        self.paths.clear();
        self.position = 0;
    }
}
