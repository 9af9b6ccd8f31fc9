use dossier_core::error::DossierError;
use dossier_core::llm::OpenAiCompatClient;
use std::path::PathBuf;

use crate::output;

pub fn run(input_file: PathBuf) -> Result<(), DossierError> {
    let text = std::fs::read_to_string(&input_file)?;
    let client = OpenAiCompatClient::from_env()?;
    tracing::info!(model = client.model(), "extracting entities from text");

    let entities = dossier_core::extract_entities_from_text(&text, &client);
    output::json::print(&entities)
}
