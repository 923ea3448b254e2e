use std::io::Cursor;
use std::sync::Mutex;

use ndarray::{Array2, Array4};
use tch::{CModule, Device, Kind, Tensor};

use super::{InferenceError, Predictor, output_rows};

impl From<tch::TchError> for InferenceError {
    fn from(err: tch::TchError) -> Self {
        InferenceError::Runtime(err.to_string())
    }
}

/// TorchScript classifier run through libtorch, switched to eval mode at load.
pub struct TorchPredictor {
    module: Mutex<CModule>,
    device: Device,
}

impl TorchPredictor {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, tch::TchError> {
        let device = Device::cuda_if_available();
        let mut module = CModule::load_data_on_device(&mut Cursor::new(bytes), device)?;
        module.set_eval();
        Ok(Self {
            module: Mutex::new(module),
            device,
        })
    }
}

impl Predictor for TorchPredictor {
    fn forward(&self, input: &Array4<f32>) -> Result<Array2<f32>, InferenceError> {
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data = input
            .as_slice()
            .ok_or_else(|| InferenceError::Runtime("input tensor is not contiguous".into()))?;
        let tensor = Tensor::from_slice(data)
            .view(shape.as_slice())
            .to_device(self.device);

        let module = self
            .module
            .lock()
            .map_err(|_| InferenceError::Runtime("torch module lock poisoned".into()))?;
        let output = tch::no_grad(|| module.forward_ts(&[tensor]))?;

        let output = output.to_kind(Kind::Float).to_device(Device::Cpu);
        let out_shape: Vec<usize> = output.size().iter().map(|&d| d as usize).collect();
        let values: Vec<f32> = output.view([-1]).try_into()?;

        output_rows(values, &out_shape)
    }

    fn backend(&self) -> &'static str {
        "torchscript"
    }
}
