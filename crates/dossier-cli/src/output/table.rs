use dossier_core::model::{DocumentExtraction, GeometrySource, OcrResult};

fn geometry_label(geometry: GeometrySource) -> &'static str {
    match geometry {
        GeometrySource::Native => "native",
        GeometrySource::Synthesized => "synthesized",
        GeometrySource::None => "none",
    }
}

pub fn format_ocr(result: &OcrResult) -> String {
    let mut out = String::new();

    if let Some(ref reason) = result.error {
        out.push_str(&format!("  Extraction failed: {}\n\n", reason));
    }
    if let Some(condition) = result.condition {
        out.push_str(&format!("  Condition: {}\n\n", condition));
    }

    out.push_str("=== Text ===\n\n");
    for line in result.text.lines() {
        out.push_str(&format!("  {}\n", line));
    }
    out.push('\n');

    out.push_str(&format!(
        "=== Words ({}, geometry: {}) ===\n\n",
        result.words.len(),
        geometry_label(result.geometry)
    ));
    if result.words.is_empty() {
        return out;
    }

    let max_text = result
        .words
        .iter()
        .map(|w| w.text.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    out.push_str(&format!(
        "  {:<width$}  {:>5}  {:>7} {:>7} {:>7} {:>7}\n",
        "Word",
        "Conf",
        "x0",
        "y0",
        "x1",
        "y1",
        width = max_text
    ));
    out.push_str(&format!("  {}\n", "-".repeat(max_text + 40)));
    for w in &result.words {
        let b = &w.bounding_box;
        out.push_str(&format!(
            "  {:<width$}  {:>5.2}  {:>7.1} {:>7.1} {:>7.1} {:>7.1}\n",
            w.text,
            w.confidence,
            b.x0,
            b.y0,
            b.x1,
            b.y1,
            width = max_text
        ));
    }
    out
}

pub fn print_document(doc: &DocumentExtraction, show_estimated: bool) {
    if let Some(ref reason) = doc.error {
        println!("  Extraction failed: {}\n", reason);
    }
    if let Some(condition) = doc.condition {
        println!("  Condition: {}\n", condition);
    }

    println!(
        "  {} entities (geometry: {})\n",
        doc.entities.len(),
        geometry_label(doc.geometry)
    );

    for (category, entities) in doc.entities.iter() {
        if entities.is_empty() {
            continue;
        }
        println!("=== {} ===\n", category.key());

        let max_text = entities
            .iter()
            .map(|e| e.text.chars().count())
            .max()
            .unwrap_or(10);

        for e in entities {
            let b = &e.bounding_box;
            let estimated_marker = if show_estimated && e.estimated {
                " (estimated)"
            } else {
                ""
            };
            let value = match e.value {
                Some(v) => format!("  = {}", v),
                None => String::new(),
            };
            println!(
                "  {:<width$}  {:.2}  [{:.0}, {:.0}, {:.0}x{:.0}]{}{}",
                e.text,
                e.confidence,
                b.x,
                b.y,
                b.width,
                b.height,
                value,
                estimated_marker,
                width = max_text
            );
        }
        println!();
    }

    if doc.entities.is_empty() {
        println!("  No entities found.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::model::{BBox, Word};

    #[test]
    fn test_format_ocr_lists_words() {
        let result = OcrResult::new(
            "John Smith",
            vec![
                Word::new("John", 0.91, BBox::new(10.0, 10.0, 40.0, 20.0)),
                Word::new("Smith", 0.8, BBox::new(42.0, 10.0, 80.0, 20.0)),
            ],
        );
        let out = format_ocr(&result);
        assert!(out.contains("=== Words (2, geometry: native) ==="));
        assert!(out.contains("John    0.91"));
        assert!(!out.contains("Extraction failed"));
    }

    #[test]
    fn test_format_ocr_shows_condition() {
        let out = format_ocr(&OcrResult::no_text());
        assert!(out.contains("Condition: no_text_detected"));
        assert!(out.contains("=== Words (0, geometry: none) ==="));
    }
}
