use crate::types::{Prediction, TrackingRate};

/// Frames consecutivos necesarios para consolidar una letra: ~1.33 s de
/// permanencia a la cadencia de seguimiento configurada. Cambiar la cadencia
/// cambia el umbral en frames pero apunta al mismo tiempo de reloj.
pub fn commit_threshold(rate: TrackingRate) -> u32 {
    (40.0 / 30.0 * rate.fps() as f32).round() as u32
}

/// Máquina de estados anti-parpadeo: convierte el flujo ruidoso de
/// predicciones por frame en una cadena estable de letras consolidadas.
///
/// Una predicción debe repetirse `threshold` frames seguidos para añadirse a
/// la cadena. Cualquier predicción distinta reinicia la racha. El centinela
/// `NoHand` cuenta rachas como una letra más pero nunca se consolida; sacarlo
/// del conteo cambiaría el tiempo de consolidación de la letra siguiente.
pub struct LetterStabilizer {
    pending: Option<Prediction>,
    seen: u32,
    committed: String,
    threshold: u32,
}

impl LetterStabilizer {
    pub fn new(rate: TrackingRate) -> Self {
        Self {
            pending: None,
            seen: 0,
            committed: String::new(),
            threshold: commit_threshold(rate),
        }
    }

    /// Recalibra el umbral al cambiar la cadencia; la racha en curso se conserva.
    pub fn set_tracking_rate(&mut self, rate: TrackingRate) {
        self.threshold = commit_threshold(rate);
    }

    /// Cadena consolidada hasta ahora
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Predicción en racha y su conteo, si la hay
    pub fn pending(&self) -> Option<(Prediction, u32)> {
        self.pending.map(|p| (p, self.seen))
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Acción Clear: vacía la cadena y descarta la racha pendiente
    pub fn clear(&mut self) {
        self.committed.clear();
        self.pending = None;
        self.seen = 0;
    }

    /// Procesa la predicción de un frame. Devuelve la cadena completa cuando
    /// una letra acaba de consolidarse; el disparo de la corrección externa
    /// corre a cargo del llamador.
    pub fn push(&mut self, prediction: Prediction) -> Option<&str> {
        match self.pending {
            Some(current) if current == prediction => self.seen += 1,
            _ => {
                self.pending = Some(prediction);
                self.seen = 1;
            }
        }

        if let Some(Prediction::Letter(letter)) = self.pending {
            if self.seen >= self.threshold {
                self.committed.push(letter);
                self.pending = None;
                self.seen = 0;
                return Some(self.committed.as_str());
            }
        }

        None
    }
}
