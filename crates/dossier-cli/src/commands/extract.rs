use dossier_core::error::DossierError;
use std::path::PathBuf;

use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    show_estimated: bool,
) -> Result<(), DossierError> {
    let extractor = dossier_core::default_extractor()?;
    let doc = dossier_core::process_document(&input_file, &extractor);

    match output_format {
        "json" => output::json::print(&doc)?,
        _ => output::table::print_document(&doc, show_estimated),
    }

    Ok(())
}
