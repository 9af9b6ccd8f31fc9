use dossier_core::error::DossierError;
use dossier_core::normalize::TextNormalizer;
use dossier_core::rules::builtin;
use std::path::PathBuf;

pub fn run(
    input_file: PathBuf,
    rule_file: Option<PathBuf>,
    preset: Option<String>,
) -> Result<(), DossierError> {
    let normalizer = match (rule_file, preset) {
        (Some(path), _) => TextNormalizer::new(&dossier_core::rules::load_ruleset(&path)?)?,
        (None, Some(name)) => TextNormalizer::from_preset(&name)?,
        (None, None) => TextNormalizer::from_preset(builtin::DEFAULT_PRESET)?,
    };
    tracing::debug!(
        rules = normalizer.rule_count(),
        name = normalizer.name(),
        "normalizer loaded"
    );

    let text = std::fs::read_to_string(&input_file)?;
    println!("{}", normalizer.normalize(&text));
    Ok(())
}
