use std::io::Cursor;

use ndarray::{Array2, Array4};
use tract_onnx::prelude::{
    Datum, Framework, Graph, InferenceFact, InferenceModelExt, SimplePlan, Tensor, TractResult,
    TypedFact, TypedOp, tvec,
};

use super::{INPUT_CHANNELS, InferenceError, Predictor, output_rows};

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX classifier executed by the pure-Rust tract runtime.
pub struct OnnxPredictor {
    runnable: RunnableModel,
}

impl OnnxPredictor {
    /// Parses an ONNX graph, pins its input to `(1, size, size, 3)` f32 and optimizes it for inference.
    pub fn from_bytes(bytes: &[u8], input_size: u32) -> TractResult<Self> {
        let size = input_size as usize;
        let runnable = tract_onnx::onnx()
            .model_for_read(&mut Cursor::new(bytes))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, INPUT_CHANNELS)),
            )?
            .into_optimized()?
            .into_runnable()?;
        Ok(Self { runnable })
    }
}

impl Predictor for OnnxPredictor {
    fn forward(&self, input: &Array4<f32>) -> Result<Array2<f32>, InferenceError> {
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_shape(input.shape(), &data)
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let outputs = self
            .runnable
            .run(tvec![tensor.into()])
            .map_err(|e| InferenceError::Runtime(format!("tract execution failed: {e}")))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::Output("model produced no outputs".into()))?;
        let values = output
            .as_slice::<f32>()
            .map_err(|e| InferenceError::Output(e.to_string()))?
            .to_vec();

        output_rows(values, output.shape())
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }
}

/// `sigmoid(mean(input))` over a `(1, h, w, 3)` input, emitting a single score.
#[cfg(test)]
pub(crate) const MEAN_SIGMOID_ONNX: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/mean_sigmoid.onnx"));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LoadedModel;

    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    #[test]
    fn runs_pinned_nhwc_graph_to_a_single_score() {
        let predictor = OnnxPredictor::from_bytes(MEAN_SIGMOID_ONNX, 224).unwrap();

        let zeros = predictor.forward(&Array4::zeros((1, 224, 224, 3))).unwrap();
        assert_eq!(zeros.dim(), (1, 1));
        assert!((zeros[[0, 0]] - 0.5).abs() < 1e-6);

        let twos = predictor
            .forward(&Array4::from_elem((1, 224, 224, 3), 2.0))
            .unwrap();
        assert!((twos[[0, 0]] - sigmoid(2.0)).abs() < 1e-5);
    }

    #[test]
    fn score_depends_on_every_channel() {
        let predictor = OnnxPredictor::from_bytes(MEAN_SIGMOID_ONNX, 224).unwrap();
        let input =
            Array4::from_shape_fn((1, 224, 224, 3), |(_, _, _, c)| if c == 2 { 3.0 } else { 0.0 });

        let output = predictor.forward(&input).unwrap();
        assert!((output[[0, 0]] - sigmoid(1.0)).abs() < 1e-5);
    }

    #[test]
    fn loaded_model_rejects_other_resolutions_before_running() {
        let predictor = OnnxPredictor::from_bytes(MEAN_SIGMOID_ONNX, 224).unwrap();
        let model = LoadedModel::new("primary", "fixture.onnx", 224, Box::new(predictor));

        let err = model.forward(&Array4::zeros((1, 256, 256, 3))).unwrap_err();
        assert!(matches!(err, InferenceError::InputShape { expected: [1, 224, 224, 3], .. }));
        assert_eq!(model.backend(), "onnx");
    }
}
