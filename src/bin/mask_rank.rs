use mask_saliency::config::rank::{self, RuntimeConfig};
use mask_saliency::diagnostics::RankingReport;
use mask_saliency::image::io::{load_grayscale_image, save_rgb8, write_json_file};
use mask_saliency::sources::{DetectionFile, SaliencyFile};
use mask_saliency::MaskRanker;
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = rank::load_config(Path::new(&config_path))?;

    let ranker = MaskRanker::new(config.params.clone());
    let detection_file = DetectionFile::new(&config.detections);
    let saliency_file = SaliencyFile::new(&config.saliency);

    let (report, detections) = match &config.image {
        Some(image_path) => {
            let image = load_grayscale_image(image_path)?;
            let view = image.as_view();
            let report = ranker.rank_image(&detection_file, &saliency_file, &view)?;
            (report, None)
        }
        None => {
            let detections = detection_file.load()?;
            let saliency = saliency_file.load()?;
            (ranker.rank(&detections, &saliency)?, Some(detections))
        }
    };

    emit_report(&config, &report)?;

    if let Some(path) = &config.output.overlay_out {
        let detections = match detections {
            Some(d) => d,
            None => detection_file.load()?,
        };
        let overlay = ranker.overlay(&detections, &report);
        save_rgb8(&overlay, path)?;
        eprintln!("Overlay written to {}", path.display());
    }

    Ok(())
}

fn emit_report(
    config: &RuntimeConfig,
    report: &RankingReport,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = config.output.format;
    if format.includes_text() {
        report.print_text_summary();
    }
    if let Some(path) = config.output.json_file() {
        write_json_file(path, report)?;
        eprintln!("JSON report written to {}", path.display());
    } else if format.includes_json() {
        let json = serde_json::to_string_pretty(report)?;
        if format.includes_text() {
            println!("\nJSON report:\n{json}");
        } else {
            println!("{json}");
        }
    }
    Ok(())
}

fn usage() -> String {
    "Usage: mask_rank <config.json>".to_string()
}
