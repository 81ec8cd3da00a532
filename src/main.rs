/*
Deletreo ASL en Tiempo Real - Rust Puro + ONNX

Pipeline de deletreo que:
1. Reproduce sesiones grabadas de articulaciones de mano (CSV)
2. Normaliza las 21 articulaciones al marco del modelo
3. Clasifica la letra con ONNX Runtime (SVC, etiquetas 1..=26)
4. Estabiliza la letra con un debounce de ~1.33 s y consolida la cadena
5. Dispara la corrección ortográfica vía OpenAI (fire-and-forget)

Antes de todo, asegurarse de tener onnxruntime instalado.
wget https://github.com/microsoft/onnxruntime/releases/download/v1.22.0/onnxruntime-linux-x64-1.22.0.tgz
tar -xzf onnxruntime-linux-x64-1.22.0.tgz

Para compilar y ejecutar:
set -x LD_LIBRARY_PATH (pwd)/onnxruntime-linux-x64-1.22.0/lib $LD_LIBRARY_PATH
     ./target/release/deletreo modelo_asl.onnx sesiones/hola.csv --fps 30

Con OPENAI_API_KEY definida, cada letra consolidada pide corrección.
*/

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use crossbeam_channel::bounded;

use deletreo::csv_loader::{load_session_from_csv, RecordedFrame, ReplayDetector};
use deletreo::frame_pipeline::FramePipeline;
use deletreo::letter_classifier::OnnxLetterClassifier;
use deletreo::resource_monitor::ResourceMonitor;
use deletreo::spell_corrector::SpellCorrector;
use deletreo::types::{TrackingRate, CAPTURE_FPS};

/// Frames entre líneas de telemetría (~5 s a 30 fps)
const TELEMETRY_INTERVAL: u64 = 150;

struct Options {
    model_path: String,
    session_path: PathBuf,
    rate: TrackingRate,
    show_corrected: bool,
}

fn parse_args() -> Result<Options> {
    let mut rate = TrackingRate::default();
    let mut show_corrected = false;
    let mut positional: Vec<String> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fps" => {
                let value = args.next().ok_or_else(|| anyhow!("--fps requiere un valor"))?;
                let fps: u32 = value.parse()?;
                rate = TrackingRate::from_fps(fps)
                    .ok_or_else(|| anyhow!("fps no soportado: {} (usa 1, 3, 10, 15 o 30)", fps))?;
            }
            "--show-corrected" => show_corrected = true,
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        bail!("Uso: deletreo <modelo.onnx> <sesion.csv|directorio> [--fps N] [--show-corrected]");
    }

    let mut positional = positional.into_iter();
    Ok(Options {
        model_path: positional.next().unwrap(),
        session_path: PathBuf::from(positional.next().unwrap()),
        rate,
        show_corrected,
    })
}

/// Si el argumento es un directorio, elige un CSV al azar (útil para demos)
fn resolve_session_csv(path: &PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.clone());
    }

    let csv_files: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();

    if csv_files.is_empty() {
        bail!("No hay archivos CSV en {:?}", path);
    }

    use rand::Rng;
    let random_idx = rand::thread_rng().gen_range(0..csv_files.len());
    Ok(csv_files[random_idx].clone())
}

fn main() -> Result<()> {
    println!("🔤 Deletreo ASL - Rust + ONNX\n");

    let opts = parse_args()?;
    let csv_path = resolve_session_csv(&opts.session_path)?;
    println!("📄 Sesión: {:?}", csv_path);
    println!("🎚️  Cadencia de seguimiento: {} fps\n", opts.rate.fps());

    let session = load_session_from_csv(&csv_path)?;
    println!("✅ {} frames cargados\n", session.len());

    println!("🔧 Inicializando clasificador ONNX...");
    let classifier = OnnxLetterClassifier::new(&opts.model_path)?;
    println!("✅ Clasificador cargado\n");

    let corrector = match SpellCorrector::from_env() {
        Ok(corrector) => Some(corrector),
        Err(_) => {
            println!("⚠️  OPENAI_API_KEY no definida; corrección deshabilitada\n");
            None
        }
    };

    let mut pipeline = FramePipeline::new(ReplayDetector, classifier, opts.rate);

    if let Some(corrector) = corrector.clone() {
        let slot = pipeline.corrected_slot();
        pipeline.set_commit_hook(move |committed| {
            corrector.request_correction(committed.to_string(), Arc::clone(&slot));
        });
    }

    let mut monitor = ResourceMonitor::new()?;

    // Hilo productor: entrega los frames grabados a cadencia de cámara
    let (tx, rx) = bounded::<RecordedFrame>(100);
    std::thread::spawn(move || {
        let frame_period = Duration::from_millis(1000 / CAPTURE_FPS as u64);
        for frame in session {
            if tx.send(frame).is_err() {
                return;
            }
            std::thread::sleep(frame_period);
        }
    });

    println!("🎬 Iniciando reconocimiento...\n");

    let mut frames_seen = 0u64;
    let mut last_letter = String::new();
    let mut last_committed = String::new();

    while let Ok(frame) = rx.recv() {
        frames_seen += 1;

        if let Some(output) = pipeline.process_frame(&frame) {
            if output.letter != last_letter {
                println!(
                    "🔤 {} ({:.1}%)  [detector {} fps | modelo {} fps]",
                    output.letter,
                    output.confidence * 100.0,
                    output.detector_fps,
                    output.model_fps
                );
                last_letter = output.letter.clone();
            }

            if output.committed != last_committed {
                println!("📝 Cadena: {}", output.committed);
                last_committed = output.committed.clone();
            }
        }

        if frames_seen % TELEMETRY_INTERVAL == 0 {
            let usage = monitor.sample();
            println!(
                "📊 CPU {:.1}% | Memoria {} MB / {} MB",
                usage.cpu_percent, usage.resident_mb, usage.total_mb
            );
        }
    }

    println!("\n✅ Sesión terminada. Cadena consolidada: {}", pipeline.committed());

    if corrector.is_some() {
        // Dar un margen a las correcciones en vuelo antes de leer el slot
        std::thread::sleep(Duration::from_secs(3));
    }

    if opts.show_corrected {
        let slot = pipeline.corrected_slot();
        match slot.lock().ok().and_then(|guard| guard.clone()) {
            Some(corrected) => println!("🤖 Corregido: {}", corrected),
            None => println!("🤖 Sin corrección disponible"),
        }
    }

    Ok(())
}
