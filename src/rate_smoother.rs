use std::collections::VecDeque;

/// Ventana por defecto del promedio móvil
pub const DEFAULT_WINDOW: usize = 10;

/// Promedio móvil de capacidad fija para estabilizar una tasa ruidosa
/// (p. ej. el rendimiento del detector en frames por segundo).
///
/// El buffer arranca lleno de ceros, así que el promedio mostrado es
/// artificialmente bajo durante las primeras `capacity` muestras; es el
/// transitorio de arranque aceptado, no un defecto.
pub struct RateSmoother {
    samples: VecDeque<u32>,
    capacity: usize,
}

impl RateSmoother {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "la ventana debe tener al menos una muestra");
        Self {
            samples: std::iter::repeat(0).take(capacity).collect(),
            capacity,
        }
    }

    /// Añade una muestra y expulsa la más antigua (anillo de tamaño fijo)
    pub fn push(&mut self, sample: u32) {
        self.samples.push_back(sample);
        self.samples.pop_front();
    }

    /// Media truncada a entero sobre toda la ventana
    pub fn average(&self) -> u32 {
        let sum: u32 = self.samples.iter().sum();
        sum / self.capacity as u32
    }

    /// Vuelve al estado inicial (todo ceros)
    pub fn reset(&mut self) {
        self.samples.clear();
        self.samples.extend(std::iter::repeat(0).take(self.capacity));
    }
}

impl Default for RateSmoother {
    fn default() -> Self {
        Self::new()
    }
}
