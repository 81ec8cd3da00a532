use std::collections::HashMap;
use std::fmt;

/// Articulaciones de la mano según el orden anatómico del detector:
/// muñeca, pulgar×4, índice×4, medio×4, anular×4, meñique×4.
pub const NUM_JOINTS: usize = 21;

/// Índice de la muñeca
pub const WRIST: usize = 0;

/// Índice del nudillo (MCP) del dedo medio, usado como centro de referencia
pub const MIDDLE_MCP: usize = 9;

/// Vector de características: pares x,y intercalados de las 21 articulaciones
pub const FEATURE_LEN: usize = 42;

/// Letras del alfabeto (etiquetas 1..=26 del clasificador)
pub const NUM_LETTERS: usize = 26;

/// Cadencia a la que la cámara entrega frames (Hz)
pub const CAPTURE_FPS: u32 = 30;

/// Convierte una etiqueta del clasificador (1..=26) en su letra 'A'..='Z'.
/// Etiquetas fuera de rango devuelven None y el frame debe descartarse.
pub fn letter_for_label(label: u32) -> Option<char> {
    if (1..=NUM_LETTERS as u32).contains(&label) {
        Some((b'A' + (label - 1) as u8) as char)
    } else {
        None
    }
}

/// Una articulación en coordenadas de imagen normalizadas (nominalmente [0,1],
/// aunque el detector puede salirse del rango).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Joint {
    pub x: f32,
    pub y: f32,
}

impl Joint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Lateralidad de la mano detectada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chirality {
    Left,
    Right,
    Unknown,
}

impl Chirality {
    /// Interpreta la etiqueta textual del detector ("Left"/"Right");
    /// cualquier otro valor se trata como Unknown.
    pub fn parse(label: &str) -> Self {
        match label {
            "Left" => Chirality::Left,
            "Right" => Chirality::Right,
            _ => Chirality::Unknown,
        }
    }
}

/// Una mano detectada en un frame: 21 articulaciones más su lateralidad.
/// Se produce fresca en cada frame procesado y no persiste entre frames.
#[derive(Debug, Clone, Copy)]
pub struct HandObservation {
    pub joints: [Joint; NUM_JOINTS],
    pub chirality: Chirality,
}

/// Vector de entrada del clasificador: [x0, y0, x1, y1, ..., x20, y20]
pub type FeatureVector = [f32; FEATURE_LEN];

/// Resultado del clasificador externo para un vector de características
#[derive(Debug, Clone)]
pub struct Classification {
    /// Etiqueta ganadora, 1..=26
    pub label: u32,
    /// Probabilidad por etiqueta
    pub probabilities: HashMap<u32, f32>,
}

impl Classification {
    /// Probabilidad de la etiqueta ganadora
    pub fn confidence(&self) -> f32 {
        self.probabilities.get(&self.label).copied().unwrap_or(0.0)
    }
}

/// Predicción por frame que alimenta al estabilizador. `NoHand` es el
/// centinela "NA": participa en el conteo de rachas pero nunca se consolida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Letter(char),
    NoHand,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Letter(c) => write!(f, "{}", c),
            Prediction::NoHand => write!(f, "NA"),
        }
    }
}

/// Cadencia de seguimiento configurable desde la interfaz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingRate {
    Fps1,
    Fps3,
    Fps10,
    Fps15,
    Fps30,
}

impl TrackingRate {
    pub fn fps(self) -> u32 {
        match self {
            TrackingRate::Fps1 => 1,
            TrackingRate::Fps3 => 3,
            TrackingRate::Fps10 => 10,
            TrackingRate::Fps15 => 15,
            TrackingRate::Fps30 => 30,
        }
    }

    pub fn from_fps(fps: u32) -> Option<Self> {
        match fps {
            1 => Some(TrackingRate::Fps1),
            3 => Some(TrackingRate::Fps3),
            10 => Some(TrackingRate::Fps10),
            15 => Some(TrackingRate::Fps15),
            30 => Some(TrackingRate::Fps30),
            _ => None,
        }
    }

    /// Se procesa 1 de cada `frame_interval()` frames entrantes.
    /// División entera: cadencias que no dividen a 30 quedan cuantizadas.
    pub fn frame_interval(self) -> u64 {
        (CAPTURE_FPS / self.fps()) as u64
    }
}

impl Default for TrackingRate {
    fn default() -> Self {
        TrackingRate::Fps30
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_mapping_bounds() {
        assert_eq!(letter_for_label(1), Some('A'));
        assert_eq!(letter_for_label(26), Some('Z'));
        assert_eq!(letter_for_label(0), None);
        assert_eq!(letter_for_label(27), None);
    }

    #[test]
    fn test_tracking_rate_intervals() {
        assert_eq!(TrackingRate::Fps30.frame_interval(), 1);
        assert_eq!(TrackingRate::Fps15.frame_interval(), 2);
        assert_eq!(TrackingRate::Fps10.frame_interval(), 3);
        assert_eq!(TrackingRate::Fps3.frame_interval(), 10);
        assert_eq!(TrackingRate::Fps1.frame_interval(), 30);
    }

    #[test]
    fn test_tracking_rate_rejects_unsupported_fps() {
        assert_eq!(TrackingRate::from_fps(15), Some(TrackingRate::Fps15));
        assert_eq!(TrackingRate::from_fps(60), None);
        assert_eq!(TrackingRate::from_fps(0), None);
    }

    #[test]
    fn test_chirality_parse() {
        assert_eq!(Chirality::parse("Left"), Chirality::Left);
        assert_eq!(Chirality::parse("Right"), Chirality::Right);
        assert_eq!(Chirality::parse(""), Chirality::Unknown);
        assert_eq!(Chirality::parse("left"), Chirality::Unknown);
    }

    #[test]
    fn test_confidence_reads_winning_label() {
        let mut probabilities = HashMap::new();
        probabilities.insert(1, 0.7);
        probabilities.insert(2, 0.3);
        let result = Classification {
            label: 1,
            probabilities,
        };
        assert!((result.confidence() - 0.7).abs() < 1e-6);
    }
}
