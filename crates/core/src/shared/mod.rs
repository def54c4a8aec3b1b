pub mod constants;
pub mod device_info;
pub mod frame_image;
