pub mod null_motion_sensor;
pub mod scripted_motion_sensor;
