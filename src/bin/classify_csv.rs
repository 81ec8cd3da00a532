use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use deletreo::csv_loader::load_session_from_csv;
use deletreo::joint_normalizer::normalize;
use deletreo::letter_classifier::{LetterClassifier, OnnxLetterClassifier};
use deletreo::types::letter_for_label;

struct ReplayOptions {
    dump_features: bool,
}

fn parse_args() -> Result<(String, PathBuf, ReplayOptions)> {
    let mut dump_features = false;
    let mut positional: Vec<String> = Vec::new();

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--dump-features" => dump_features = true,
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        bail!("Uso: classify_csv [--dump-features] <modelo.onnx> <sesion.csv>");
    }

    let mut positional = positional.into_iter();
    Ok((
        positional.next().unwrap(),
        PathBuf::from(positional.next().unwrap()),
        ReplayOptions { dump_features },
    ))
}

fn main() -> Result<()> {
    let (model_path, csv_path, opts) = parse_args()?;
    println!("🎞️  Clasificando sesión desde {:?}", csv_path);

    let session = load_session_from_csv(&csv_path)?;
    let observation = session
        .iter()
        .flatten()
        .next()
        .ok_or_else(|| anyhow!("La sesión no contiene ningún frame con mano"))?;

    let features = normalize(observation)?;

    let mut classifier = OnnxLetterClassifier::new(&model_path)?;
    let classification = classifier.classify(&features)?;

    let letter = letter_for_label(classification.label)
        .ok_or_else(|| anyhow!("Etiqueta fuera de rango: {}", classification.label))?;
    println!(
        "\n🥇 Letra: {} ({:.1}%)",
        letter,
        classification.confidence() * 100.0
    );

    let mut scores: Vec<(u32, f32)> = classification.probabilities.into_iter().collect();
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    println!("\nTop-5 probabilidades:");
    for (idx, (label, score)) in scores.iter().take(5).enumerate() {
        let letter = letter_for_label(*label).unwrap_or('?');
        println!("  {:>2}. {:<3} {:>6.2}%", idx + 1, letter, score * 100.0);
    }

    if opts.dump_features {
        println!("\n📊 42 features (orden exacto):");
        for (idx, value) in features.iter().enumerate() {
            println!("  {:02}: {:>12.6}", idx, value);
        }
    }

    Ok(())
}
