use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;

use crate::frame_pipeline::HandDetector;
use crate::types::{Chirality, HandObservation, Joint, NUM_JOINTS};

/// Un frame grabado: `None` representa un frame sin mano detectada
pub type RecordedFrame = Option<HandObservation>;

/// Carga una sesión grabada desde un CSV en el formato
/// frame,chirality,joint,x,y con una fila por articulación.
///
/// Los frames ausentes del archivo (huecos en la numeración) se interpretan
/// como frames sin mano. Un frame presente debe traer sus 21 articulaciones.
pub fn load_session_from_csv(path: impl AsRef<Path>) -> Result<Vec<RecordedFrame>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut frames: BTreeMap<usize, (Chirality, [Option<Joint>; NUM_JOINTS])> = BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;
        if record.len() < 5 {
            bail!("La fila {} no tiene 5 columnas", row_idx + 1);
        }

        let frame_idx: usize = record[0]
            .parse()
            .with_context(|| format!("frame inválido en fila {}", row_idx + 1))?;
        let chirality = Chirality::parse(&record[1]);
        let joint_idx: usize = record[2]
            .parse()
            .with_context(|| format!("joint inválido en fila {}", row_idx + 1))?;

        if joint_idx >= NUM_JOINTS {
            bail!("Articulación {} fuera de rango (fila {})", joint_idx, row_idx + 1);
        }

        let x: f32 = record[3].parse()?;
        let y: f32 = record[4].parse()?;

        let entry = frames
            .entry(frame_idx)
            .or_insert((chirality, [None; NUM_JOINTS]));
        entry.1[joint_idx] = Some(Joint::new(x, y));
    }

    if frames.is_empty() {
        return Err(anyhow!("El CSV {:?} no contiene datos", path));
    }

    let max_frame = *frames.keys().max().unwrap();
    let mut session = Vec::with_capacity(max_frame + 1);
    for frame_idx in 0..=max_frame {
        match frames.get(&frame_idx) {
            Some((chirality, maybe_joints)) => {
                let mut joints = [Joint::default(); NUM_JOINTS];
                for (joint_idx, maybe) in maybe_joints.iter().enumerate() {
                    joints[joint_idx] = maybe.ok_or_else(|| {
                        anyhow!(
                            "Frame {} incompleto: falta la articulación {}",
                            frame_idx,
                            joint_idx
                        )
                    })?;
                }
                session.push(Some(HandObservation {
                    joints,
                    chirality: *chirality,
                }));
            }
            // Hueco en la numeración: frame sin mano
            None => session.push(None),
        }
    }

    Ok(session)
}

/// Detector de reproducción: entrega las observaciones tal cual vienen
/// grabadas, sin inferencia de por medio.
pub struct ReplayDetector;

impl HandDetector for ReplayDetector {
    type Frame = RecordedFrame;

    fn detect(&mut self, frame: &RecordedFrame) -> Result<Vec<HandObservation>> {
        Ok(frame.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn full_frame_rows(frame: usize, chirality: &str) -> String {
        let mut rows = String::new();
        for joint in 0..NUM_JOINTS {
            rows.push_str(&format!(
                "{},{},{},{},{}\n",
                frame,
                chirality,
                joint,
                0.1 + 0.01 * joint as f32,
                0.9 - 0.01 * joint as f32
            ));
        }
        rows
    }

    #[test]
    fn test_load_session_with_gap() {
        let mut csv = String::from("frame,chirality,joint,x,y\n");
        csv.push_str(&full_frame_rows(0, "Right"));
        // El frame 1 no aparece: debe cargarse como frame sin mano
        csv.push_str(&full_frame_rows(2, "Left"));

        let path = write_temp_csv("deletreo_session_gap.csv", &csv);
        let session = load_session_from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(session.len(), 3);
        assert!(session[0].is_some());
        assert!(session[1].is_none());
        let hand = session[2].unwrap();
        assert_eq!(hand.chirality, Chirality::Left);
        assert_eq!(hand.joints.len(), NUM_JOINTS);
    }

    #[test]
    fn test_incomplete_frame_is_rejected() {
        let mut csv = String::from("frame,chirality,joint,x,y\n");
        // Solo 3 articulaciones del frame 0
        for joint in 0..3 {
            csv.push_str(&format!("0,Right,{},0.5,0.5\n", joint));
        }

        let path = write_temp_csv("deletreo_session_short.csv", &csv);
        let result = load_session_from_csv(&path);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_joint_is_rejected() {
        let mut csv = String::from("frame,chirality,joint,x,y\n");
        csv.push_str("0,Right,21,0.5,0.5\n");

        let path = write_temp_csv("deletreo_session_joint.csv", &csv);
        let result = load_session_from_csv(&path);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_replay_detector_forwards_recording() {
        let mut detector = ReplayDetector;

        let empty: RecordedFrame = None;
        assert!(detector.detect(&empty).unwrap().is_empty());

        let hand = HandObservation {
            joints: [Joint::new(0.5, 0.5); NUM_JOINTS],
            chirality: Chirality::Right,
        };
        let recorded: RecordedFrame = Some(hand);
        assert_eq!(detector.detect(&recorded).unwrap().len(), 1);
    }
}
