use dossier_core::error::DossierError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), DossierError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
