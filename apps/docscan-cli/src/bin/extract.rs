use std::env;

use docscan_cli::logging;
use docscan_core::config::{expand_path, Config};
use docscan_core::traits::TextExtractor;
use docscan_extract::Extractors;

fn main() -> anyhow::Result<()> {
    let _guard = logging::init(None, true);
    let Some(file) = env::args().nth(1).map(expand_path) else {
        eprintln!("Usage: docscan-extract <FILE>");
        std::process::exit(2);
    };
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    let extractors = Extractors::new(config.ocr()?);
    let text = extractors.extract(&file)?;
    println!("{}", text);
    eprintln!("{} words, {} characters", text.split_whitespace().count(), text.chars().count());
    Ok(())
}
