use thiserror::Error;

use crate::types::{Chirality, FeatureVector, HandObservation, MIDDLE_MCP, NUM_JOINTS, WRIST};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Degenerate scale: wrist coincides with middle-finger MCP")]
    DegenerateScale,
}

/// Convierte las 21 articulaciones crudas en el vector de 42 características
/// que espera el clasificador. Replica el preprocesado del modelo original:
///
/// 1. Manos izquierdas se espejan en x (el modelo se entrenó con mano derecha).
/// 2. Se centra todo sobre el MCP del dedo medio (índice 9).
/// 3. Se escala por la distancia muñeca → MCP del medio.
///
/// El resultado es invariante a posición, escala y lateralidad de la mano.
pub fn normalize(observation: &HandObservation) -> Result<FeatureVector, NormalizeError> {
    let mut joints = observation.joints;

    if observation.chirality == Chirality::Left {
        for joint in joints.iter_mut() {
            joint.x = 1.0 - joint.x;
        }
    }

    // Centrar sobre el MCP del dedo medio (que pasa a ser el origen)
    let center = joints[MIDDLE_MCP];
    for joint in joints.iter_mut() {
        joint.x -= center.x;
        joint.y -= center.y;
    }

    // Distancia muñeca → origen; si es cero no hay escala válida
    let wrist = joints[WRIST];
    let length = (wrist.x * wrist.x + wrist.y * wrist.y).sqrt();
    if length == 0.0 {
        return Err(NormalizeError::DegenerateScale);
    }

    let mut features = [0.0f32; NUM_JOINTS * 2];
    for (i, joint) in joints.iter().enumerate() {
        features[2 * i] = joint.x / length;
        features[2 * i + 1] = joint.y / length;
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Joint;

    /// Mano sintética con articulaciones separadas de forma reproducible
    fn sample_joints() -> [Joint; NUM_JOINTS] {
        let mut joints = [Joint::default(); NUM_JOINTS];
        for (i, joint) in joints.iter_mut().enumerate() {
            joint.x = 0.3 + 0.02 * i as f32;
            joint.y = 0.7 - 0.025 * i as f32;
        }
        joints
    }

    fn assert_features_close(a: &FeatureVector, b: &FeatureVector) {
        for (idx, (va, vb)) in a.iter().zip(b.iter()).enumerate() {
            assert!(
                (va - vb).abs() < 1e-4,
                "feature {} difiere: {} vs {}",
                idx,
                va,
                vb
            );
        }
    }

    #[test]
    fn test_center_joint_maps_to_origin() {
        let observation = HandObservation {
            joints: sample_joints(),
            chirality: Chirality::Right,
        };
        let features = normalize(&observation).unwrap();
        assert_eq!(features[2 * MIDDLE_MCP], 0.0);
        assert_eq!(features[2 * MIDDLE_MCP + 1], 0.0);
    }

    #[test]
    fn test_scale_invariance_about_center() {
        let base = sample_joints();
        let center = base[MIDDLE_MCP];

        // Reescalar uniformemente todas las articulaciones alrededor del centro
        let mut scaled = base;
        for joint in scaled.iter_mut() {
            joint.x = center.x + (joint.x - center.x) * 3.5;
            joint.y = center.y + (joint.y - center.y) * 3.5;
        }

        let original = normalize(&HandObservation {
            joints: base,
            chirality: Chirality::Right,
        })
        .unwrap();
        let rescaled = normalize(&HandObservation {
            joints: scaled,
            chirality: Chirality::Right,
        })
        .unwrap();

        assert_features_close(&original, &rescaled);
    }

    #[test]
    fn test_translation_invariance() {
        let base = sample_joints();
        let mut shifted = base;
        for joint in shifted.iter_mut() {
            joint.x += 0.18;
            joint.y -= 0.09;
        }

        let original = normalize(&HandObservation {
            joints: base,
            chirality: Chirality::Right,
        })
        .unwrap();
        let moved = normalize(&HandObservation {
            joints: shifted,
            chirality: Chirality::Right,
        })
        .unwrap();

        assert_features_close(&original, &moved);
    }

    #[test]
    fn test_mirror_round_trip() {
        let base = sample_joints();
        let mut mirrored = base;
        for joint in mirrored.iter_mut() {
            joint.x = 1.0 - joint.x;
        }

        // Una mano izquierda y su espejo derecho deben producir lo mismo
        let left = normalize(&HandObservation {
            joints: base,
            chirality: Chirality::Left,
        })
        .unwrap();
        let right = normalize(&HandObservation {
            joints: mirrored,
            chirality: Chirality::Right,
        })
        .unwrap();

        assert_features_close(&left, &right);
    }

    #[test]
    fn test_unknown_chirality_passes_through() {
        let base = sample_joints();
        let right = normalize(&HandObservation {
            joints: base,
            chirality: Chirality::Right,
        })
        .unwrap();
        let unknown = normalize(&HandObservation {
            joints: base,
            chirality: Chirality::Unknown,
        })
        .unwrap();
        assert_features_close(&right, &unknown);
    }

    #[test]
    fn test_degenerate_scale_is_rejected() {
        // Muñeca y MCP del medio en el mismo punto: escala cero
        let mut joints = sample_joints();
        joints[WRIST] = joints[MIDDLE_MCP];

        let result = normalize(&HandObservation {
            joints,
            chirality: Chirality::Right,
        });
        assert_eq!(result, Err(NormalizeError::DegenerateScale));
    }

    #[test]
    fn test_output_never_contains_nan() {
        let observation = HandObservation {
            joints: sample_joints(),
            chirality: Chirality::Left,
        };
        let features = normalize(&observation).unwrap();
        assert!(features.iter().all(|v| v.is_finite()));
    }
}
