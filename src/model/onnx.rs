//! ONNX Runtime backend.
//!
//! The exported network takes a `(1, 3, H, W)` float tensor and returns two
//! log-probabilities. `ort` sessions need `&mut` to run, so the session sits
//! behind a mutex; requests serialise on it and nothing else.

use std::sync::Mutex;

use ndarray::ArrayView4;
use ort::{session::Session, value::TensorRef};

use crate::config::ModelConfig;

use super::ModelError;

#[derive(Debug)]
pub struct OnnxModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxModel {
    /// Load the checkpoint at `config.path` into a CPU session.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let load_err = |e: ort::Error| ModelError::Load {
            path: config.path.clone(),
            reason: e.to_string(),
        };
        if !config.path.is_file() {
            return Err(ModelError::Load {
                path: config.path.clone(),
                reason: "checkpoint file not found".into(),
            });
        }
        let session = Session::builder()
            .map_err(load_err)?
            .commit_from_file(&config.path)
            .map_err(load_err)?;

        Ok(Self {
            session: Mutex::new(session),
            input_name: config.input_name.clone(),
            output_name: config.output_name.clone(),
        })
    }

    pub fn infer(&self, batch: ArrayView4<'_, f32>) -> Result<Vec<f32>, ModelError> {
        let shape: [usize; 4] = batch.dim().into();
        let contiguous = batch.as_standard_layout();
        let data = contiguous
            .as_slice()
            .ok_or_else(|| ModelError::Inference("batch is not contiguous".into()))?;

        let input = TensorRef::from_array_view((shape, data))
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::SessionPoisoned)?;

        let outputs = session
            .run(ort::inputs! { self.input_name.as_str() => input })
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let value = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ModelError::Inference(format!("output \"{}\" missing from session results", self.output_name))
        })?;
        let (_, logits) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        Ok(logits.to_vec())
    }
}
