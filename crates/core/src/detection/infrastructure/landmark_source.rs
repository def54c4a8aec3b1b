use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_engine::LandmarkEngine;
use crate::shared::frame_image::FrameImage;

/// Result of one accepted submission: the primary face's landmarks, an
/// explicit no-face indication, or a stringified engine error.
pub type DetectionOutcome = Result<Option<FaceLandmarks>, String>;

/// Converts the synchronous engine into a submit/deliver callback pair.
///
/// The engine runs on a dedicated worker thread behind capacity-1 channels:
/// at most one submission is outstanding at a time (the engine is not
/// reentrant), and results come back strictly FIFO with submissions, exactly
/// one per accepted frame.
pub struct LandmarkSource {
    frame_tx: Option<Sender<FrameImage>>,
    result_rx: Receiver<DetectionOutcome>,
    worker: Option<JoinHandle<()>>,
    outstanding: bool,
}

impl LandmarkSource {
    pub fn spawn(mut engine: Box<dyn LandmarkEngine>) -> Self {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<FrameImage>(1);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<DetectionOutcome>(1);

        let worker = std::thread::spawn(move || {
            for frame in frame_rx {
                let outcome = engine
                    .process(&frame)
                    .map(|mut faces| {
                        if faces.is_empty() {
                            None
                        } else {
                            Some(faces.swap_remove(0))
                        }
                    })
                    .map_err(|e| e.to_string());
                if result_tx.send(outcome).is_err() {
                    break;
                }
            }
        });

        Self {
            frame_tx: Some(frame_tx),
            result_rx,
            worker: Some(worker),
            outstanding: false,
        }
    }

    /// Whether a submission's result has not been delivered yet.
    pub fn busy(&self) -> bool {
        self.outstanding
    }

    /// Enqueue one frame for processing.
    ///
    /// Errors if the previous submission's result has not been consumed;
    /// callers pace submissions on [`busy`](Self::busy).
    pub fn submit(&mut self, frame: FrameImage) -> Result<(), &'static str> {
        if self.outstanding {
            return Err("a submission is already outstanding");
        }
        let tx = self
            .frame_tx
            .as_ref()
            .ok_or("landmark source is shut down")?;
        tx.send(frame)
            .map_err(|_| "landmark engine worker stopped")?;
        self.outstanding = true;
        Ok(())
    }

    /// The outstanding submission's result, once delivered.
    pub fn try_result(&mut self) -> Option<DetectionOutcome> {
        match self.result_rx.try_recv() {
            Ok(outcome) => {
                self.outstanding = false;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.outstanding {
                    self.outstanding = false;
                    Some(Err("landmark engine worker stopped".to_string()))
                } else {
                    None
                }
            }
        }
    }
}

impl Drop for LandmarkSource {
    fn drop(&mut self) {
        // Closing the frame channel ends the worker loop.
        self.frame_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("landmark engine worker panicked");
            }
        }
    }
}
