use anyhow::{anyhow, Result};
use sysinfo::{Pid, System};

/// Consumo instantáneo del proceso, para la línea de telemetría
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceUsage {
    /// Uso de CPU del proceso (porcentaje, puede superar 100 con varios núcleos)
    pub cpu_percent: f32,
    /// Memoria residente del proceso en MB
    pub resident_mb: u64,
    /// Memoria total del equipo en MB
    pub total_mb: u64,
}

/// Muestreo periódico de CPU y memoria del propio proceso.
/// La primera lectura de CPU siempre es 0: sysinfo necesita dos
/// refrescos para calcular el delta.
pub struct ResourceMonitor {
    sys: System,
    pid: Pid,
}

impl ResourceMonitor {
    pub fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| anyhow!("No se pudo obtener el PID del proceso: {}", e))?;
        Ok(Self {
            sys: System::new(),
            pid,
        })
    }

    pub fn sample(&mut self) -> ResourceUsage {
        self.sys.refresh_memory();
        self.sys.refresh_process(self.pid);

        let total_mb = self.sys.total_memory() / 1024 / 1024;
        match self.sys.process(self.pid) {
            Some(process) => ResourceUsage {
                cpu_percent: process.cpu_usage(),
                resident_mb: process.memory() / 1024 / 1024,
                total_mb,
            },
            None => ResourceUsage {
                total_mb,
                ..ResourceUsage::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_reports_own_process() {
        let mut monitor = ResourceMonitor::new().unwrap();
        let usage = monitor.sample();
        // El equipo siempre tiene algo de memoria; el proceso, algo residente
        assert!(usage.total_mb > 0);
        assert!(usage.resident_mb <= usage.total_mb);
    }
}
