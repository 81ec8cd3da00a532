use std::collections::HashMap;

use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::ValueType;
use thiserror::Error;

use crate::types::{Classification, FeatureVector, FEATURE_LEN, NUM_LETTERS};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("ONNX Runtime error: {0}")]
    OnnxError(#[from] ort::Error),

    #[error("No output tensor found")]
    NoOutputTensor,

    #[error("Missing ONNX {kind}")]
    MissingIo { kind: &'static str },
}

/// Clasificador externo de letras: recibe el vector de 42 características y
/// devuelve la etiqueta ganadora (1..=26) con sus probabilidades.
pub trait LetterClassifier {
    fn classify(&mut self, features: &FeatureVector) -> Result<Classification, ClassifierError>;
}

/// Implementación sobre ONNX Runtime del modelo SVC de deletreo.
/// El fallo al cargar el modelo es fatal para el subsistema: sin sesión no
/// habrá predicciones nunca.
pub struct OnnxLetterClassifier {
    session: Session,
    input_name: String,
    prob_output_name: String,
}

impl OnnxLetterClassifier {
    pub fn new(model_path: &str) -> Result<Self, ClassifierError> {
        let session = Session::builder()?.commit_from_file(model_path)?;

        let input_name = session
            .inputs
            .get(0)
            .map(|input| input.name.clone())
            .ok_or(ClassifierError::MissingIo { kind: "input" })?;

        // Los modelos SVC exportados traen dos salidas; nos interesa el
        // tensor float de probabilidades
        let prob_output_name = session
            .outputs
            .iter()
            .find(|output| {
                matches!(
                    output.output_type,
                    ValueType::Tensor {
                        ty: TensorElementType::Float32,
                        ..
                    }
                )
            })
            .or_else(|| session.outputs.get(0))
            .map(|output| output.name.clone())
            .ok_or(ClassifierError::MissingIo { kind: "output" })?;

        println!("[ONNX] Modelo cargado: {}", model_path);
        println!("[ONNX] Input: {}", input_name);
        println!("[ONNX] Output: {}", prob_output_name);

        Ok(Self {
            session,
            input_name,
            prob_output_name,
        })
    }
}

impl LetterClassifier for OnnxLetterClassifier {
    fn classify(&mut self, features: &FeatureVector) -> Result<Classification, ClassifierError> {
        // Tensor de entrada [1, 42]
        let shape_vec = vec![1_usize, FEATURE_LEN];
        let input_value = ort::value::Value::from_array((shape_vec, features.to_vec()))?;

        let outputs = self.session.run(ort::inputs![
            self.input_name.as_str() => &input_value,
        ])?;

        let (prob_shape, prob_data) =
            outputs[self.prob_output_name.as_str()].try_extract_tensor::<f32>()?;

        let num_classes = if prob_shape.len() >= 2 {
            prob_shape[1] as usize
        } else {
            prob_shape[0] as usize
        };

        // El índice i de la salida corresponde a la etiqueta i+1 ('A'..='Z')
        let mut probabilities = HashMap::new();
        for i in 0..num_classes.min(NUM_LETTERS) {
            probabilities.insert((i + 1) as u32, prob_data[i]);
        }

        let (&label, _) = probabilities
            .iter()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .ok_or(ClassifierError::NoOutputTensor)?;

        Ok(Classification {
            label,
            probabilities,
        })
    }
}
