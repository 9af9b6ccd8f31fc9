use dossier_core::error::DossierError;
use std::path::PathBuf;

use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), DossierError> {
    let extractor = dossier_core::default_extractor()?;
    let result = dossier_core::perform_extraction(&input_file, &extractor);

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&result)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Extracted {} word(s), written to {}",
                result.words.len(),
                path.display()
            );
            if let Some(ref reason) = result.error {
                eprintln!("  warning: {}", reason);
            }
        }
        None => match output_format {
            "json" => output::json::print(&result)?,
            _ => println!("{}", output::table::format_ocr(&result)),
        },
    }

    Ok(())
}
