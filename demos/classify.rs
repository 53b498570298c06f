use std::env;

use waste_classifier::config::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args().nth(1).ok_or("usage: classify <image path>")?;

    let config = Config::from_env()?;
    let classifier = config.classifier()?;

    let image = image::open(path)?;
    let report = classifier.classify(&image)?;

    println!("{} ({})", report.prediction.label, report.confidence_percent());
    for line in &report.footprint {
        println!("{line}");
    }
    Ok(())
}
