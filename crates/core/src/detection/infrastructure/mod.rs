pub mod landmark_source;
pub mod replay_landmark_engine;
