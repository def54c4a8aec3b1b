//! Capture-session core for camera-based liveness checks.
//!
//! Acquires a camera stream, drives an external face-landmark engine, and
//! accumulates a bounded, time-ordered sequence of per-frame observations
//! (face geometry plus device motion) that a finished session hands to a
//! remote scoring service. The landmark model, the scoring algorithm and
//! all presentation live outside this crate, behind the domain seams in
//! `camera`, `detection`, `sensors` and `scoring`.

pub mod camera;
pub mod detection;
pub mod scoring;
pub mod sensors;
pub mod session;
pub mod shared;
