use dossier_core::error::DossierError;
use dossier_core::rules::builtin;
use dossier_core::rules::schema::RuleClass;
use std::path::Path;

fn class_label(class: RuleClass) -> &'static str {
    match class {
        RuleClass::Misread => "misread",
        RuleClass::Spelling => "spelling",
        RuleClass::Artifact => "artifact",
    }
}

pub fn list() -> Result<(), DossierError> {
    println!("Available predefined rule sets:\n");
    for name in builtin::PRESETS {
        let rs = builtin::load_preset(name)?;
        let default_marker = if *name == builtin::DEFAULT_PRESET {
            " [default]"
        } else {
            ""
        };
        println!(
            "  {:<12} {} (v{}, {} rules){}",
            name,
            rs.name,
            rs.version,
            rs.rules.len(),
            default_marker
        );
        if let Some(ref desc) = rs.description {
            println!("               {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: &str) -> Result<(), DossierError> {
    let rs = builtin::load_preset(preset)?;

    println!("{} (version {})\n", rs.name, rs.version);
    if let Some(ref desc) = rs.description {
        println!("{}\n", desc);
    }
    println!("Rules are applied top to bottom; later rules see earlier rewrites.\n");

    let max_id = rs
        .rules
        .iter()
        .map(|r| r.label().len())
        .max()
        .unwrap_or(10);
    let max_pattern = rs
        .rules
        .iter()
        .map(|r| r.pattern.len())
        .max()
        .unwrap_or(10);

    println!(
        "  {:<id$}  {:<8}  {:<pat$}  Replacement",
        "Rule",
        "Class",
        "Pattern",
        id = max_id,
        pat = max_pattern
    );
    println!("  {}", "-".repeat(max_id + max_pattern + 26));

    for rule in &rs.rules {
        let mut flags = Vec::new();
        if rule.case_insensitive {
            flags.push("i");
        }
        if rule.standalone {
            flags.push("standalone");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!("  ({})", flags.join(", "))
        };
        println!(
            "  {:<id$}  {:<8}  {:<pat$}  {:?}{}",
            rule.label(),
            class_label(rule.class),
            rule.pattern,
            rule.replacement,
            flags,
            id = max_id,
            pat = max_pattern
        );
    }
    println!();

    Ok(())
}

pub fn validate(file: &Path) -> Result<(), DossierError> {
    let rs = dossier_core::rules::load_ruleset(file)?;

    println!("Rule set '{}' (v{}) is valid.", rs.name, rs.version);
    println!("  Rules: {}", rs.rules.len());

    let mut warnings = Vec::new();
    for rule in &rs.rules {
        if rule.id.is_none() {
            warnings.push(format!("rule '{}' has no id", rule.pattern));
        }
        if rule.pattern.contains(' ') && rule.standalone {
            warnings.push(format!(
                "standalone rule '{}' spans whitespace; the neighbour check only looks at its ends",
                rule.label()
            ));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
