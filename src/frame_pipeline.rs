use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Result;

use crate::joint_normalizer::{self, NormalizeError};
use crate::letter_classifier::LetterClassifier;
use crate::letter_stabilizer::LetterStabilizer;
use crate::rate_smoother::RateSmoother;
use crate::types::{letter_for_label, HandObservation, Prediction, TrackingRate};

/// Fuente de observaciones de mano para un frame (detector real o replay)
pub trait HandDetector {
    type Frame;

    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<HandObservation>>;
}

/// Lo que la interfaz muestra tras procesar un frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Letra predicha en este frame, o "NA" sin mano
    pub letter: String,
    /// Probabilidad de la letra ganadora (0.0 sin mano)
    pub confidence: f32,
    /// Rendimiento del detector, suavizado con promedio móvil
    pub detector_fps: u32,
    /// Rendimiento del clasificador, instantáneo
    pub model_fps: u32,
    /// Cadena consolidada hasta ahora
    pub committed: String,
    /// Última corrección recibida, si hay alguna
    pub corrected: Option<String>,
}

/// Orquestador por frame: admisión según la cadencia configurada, detección,
/// normalización, clasificación, estabilización y disparo de la corrección.
///
/// Un frame descartado por admisión no produce salida; la interfaz conserva
/// la última. Las dos tasas de rendimiento se tratan distinto a propósito:
/// el detector se suaviza con promedio móvil, el clasificador se muestra
/// instantáneo.
pub struct FramePipeline<D: HandDetector, C: LetterClassifier> {
    detector: D,
    classifier: C,
    stabilizer: LetterStabilizer,
    detector_rate: RateSmoother,
    tracking_rate: TrackingRate,
    frame_count: u64,
    corrected: Arc<Mutex<Option<String>>>,
    on_commit: Option<Box<dyn FnMut(&str) + Send>>,
    observer: Option<Box<dyn FnMut(&FrameOutput) + Send>>,
}

impl<D: HandDetector, C: LetterClassifier> FramePipeline<D, C> {
    pub fn new(detector: D, classifier: C, tracking_rate: TrackingRate) -> Self {
        Self {
            detector,
            classifier,
            stabilizer: LetterStabilizer::new(tracking_rate),
            detector_rate: RateSmoother::new(),
            tracking_rate,
            frame_count: 0,
            corrected: Arc::new(Mutex::new(None)),
            on_commit: None,
            observer: None,
        }
    }

    /// Callback invocado con la cadena completa cada vez que se consolida
    /// una letra (aquí se engancha la corrección externa).
    pub fn set_commit_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_commit = Some(Box::new(hook));
    }

    /// Callback invocado con cada salida producida
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&FrameOutput) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    /// Slot compartido donde el corrector deposita su resultado
    pub fn corrected_slot(&self) -> Arc<Mutex<Option<String>>> {
        Arc::clone(&self.corrected)
    }

    pub fn tracking_rate(&self) -> TrackingRate {
        self.tracking_rate
    }

    /// Cambia la cadencia de seguimiento; el umbral del estabilizador se
    /// recalibra para mantener el mismo tiempo de permanencia.
    pub fn set_tracking_rate(&mut self, rate: TrackingRate) {
        self.tracking_rate = rate;
        self.stabilizer.set_tracking_rate(rate);
    }

    /// Acción Clear: vacía la cadena consolidada y la corrección mostrada
    pub fn clear(&mut self) {
        self.stabilizer.clear();
        if let Ok(mut guard) = self.corrected.lock() {
            *guard = None;
        }
    }

    pub fn committed(&self) -> &str {
        self.stabilizer.committed()
    }

    /// Procesa un frame entrante. Devuelve None si el frame fue descartado
    /// (admisión, error recuperable o etiqueta inválida).
    pub fn process_frame(&mut self, frame: &D::Frame) -> Option<FrameOutput> {
        self.frame_count += 1;
        if self.frame_count % self.tracking_rate.frame_interval() != 0 {
            return None;
        }

        // Detección cronometrada; un fallo del detector vale como frame vacío
        let started = Instant::now();
        let observations = match self.detector.detect(frame) {
            Ok(observations) => observations,
            Err(e) => {
                eprintln!("❌ Error del detector: {}", e);
                Vec::new()
            }
        };
        let detect_ms = started.elapsed().as_millis() as u64;
        self.detector_rate.push(rate_from_elapsed(detect_ms));

        let Some(observation) = observations.first() else {
            // Sin mano: la salida muestra NA pero no toca el estabilizador
            return Some(self.emit("NA".to_string(), 0.0, 0));
        };

        let features = match joint_normalizer::normalize(observation) {
            Ok(features) => features,
            Err(NormalizeError::DegenerateScale) => {
                eprintln!("⚠️ Frame descartado: escala degenerada");
                return None;
            }
        };

        // Clasificación cronometrada (tasa instantánea, sin suavizar)
        let started = Instant::now();
        let classification = match self.classifier.classify(&features) {
            Ok(classification) => classification,
            Err(e) => {
                eprintln!("❌ Error del clasificador: {}", e);
                return None;
            }
        };
        let classify_ms = started.elapsed().as_millis() as u64;
        let model_fps = rate_from_elapsed(classify_ms);

        let Some(letter) = letter_for_label(classification.label) else {
            eprintln!("⚠️ Etiqueta fuera de rango: {}", classification.label);
            return None;
        };

        let committed = self
            .stabilizer
            .push(Prediction::Letter(letter))
            .map(str::to_string);
        if let Some(committed) = &committed {
            if let Some(hook) = self.on_commit.as_mut() {
                hook(committed);
            }
        }

        Some(self.emit(letter.to_string(), classification.confidence(), model_fps))
    }

    fn emit(&mut self, letter: String, confidence: f32, model_fps: u32) -> FrameOutput {
        let corrected = self.corrected.lock().ok().and_then(|guard| guard.clone());
        let output = FrameOutput {
            letter,
            confidence,
            detector_fps: self.detector_rate.average(),
            model_fps,
            committed: self.stabilizer.committed().to_string(),
            corrected,
        };
        if let Some(observer) = self.observer.as_mut() {
            observer(&output);
        }
        output
    }
}

/// Frames por segundo a partir de una duración en ms. Con una duración de
/// 0 ms (reloj por debajo de la resolución) se reporta 0, no infinito.
fn rate_from_elapsed(elapsed_ms: u64) -> u32 {
    if elapsed_ms == 0 {
        0
    } else {
        (1000 / elapsed_ms) as u32
    }
}
