/// A single camera frame: contiguous RGB bytes in row-major order.
///
/// Pixel-format conversion happens at the camera boundary; the session and
/// detection layers treat pixel data as opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl FrameImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 3,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Position of this frame in the stream, counted from 0.
    pub fn index(&self) -> usize {
        self.index
    }
}
