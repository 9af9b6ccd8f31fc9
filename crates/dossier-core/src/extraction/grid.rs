use crate::model::{BBox, Word};

/// Fixed layout used to fabricate word boxes when a collaborator returns
/// text without geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub origin_x: f32,
    pub origin_y: f32,
    pub step_x: f32,
    pub step_y: f32,
    pub word_width: f32,
    pub word_height: f32,
    pub confidence: f32,
}

impl GridLayout {
    pub const PDF: GridLayout = GridLayout {
        columns: 10,
        origin_x: 50.0,
        origin_y: 50.0,
        step_x: 80.0,
        step_y: 30.0,
        word_width: 50.0,
        word_height: 20.0,
        confidence: 0.85,
    };

    pub const OCR: GridLayout = GridLayout {
        columns: 15,
        origin_x: 50.0,
        origin_y: 50.0,
        step_x: 60.0,
        step_y: 40.0,
        word_width: 50.0,
        word_height: 30.0,
        confidence: 0.8,
    };

    /// Box of the `index`-th word in row-major order.
    pub fn cell(&self, index: usize) -> BBox {
        let columns = self.columns.max(1);
        let x0 = self.origin_x + (index % columns) as f32 * self.step_x;
        let y0 = self.origin_y + (index / columns) as f32 * self.step_y;
        BBox::new(x0, y0, x0 + self.word_width, y0 + self.word_height)
    }
}

/// One word per whitespace-separated token, laid out on `layout`.
pub fn synthesize_words(text: &str, layout: &GridLayout) -> Vec<Word> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, token)| Word::new(token, layout.confidence, layout.cell(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_layout_wraps_after_ten() {
        let text = (0..12).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let words = synthesize_words(&text, &GridLayout::PDF);
        assert_eq!(words.len(), 12);
        assert_eq!(words[0].bounding_box, BBox::new(50.0, 50.0, 100.0, 70.0));
        assert_eq!(words[9].bounding_box, BBox::new(770.0, 50.0, 820.0, 70.0));
        assert_eq!(words[10].bounding_box, BBox::new(50.0, 80.0, 100.0, 100.0));
        assert_eq!(words[11].confidence, 0.85);
    }

    #[test]
    fn test_ocr_layout() {
        let words = synthesize_words("a b", &GridLayout::OCR);
        assert_eq!(words[1].bounding_box, BBox::new(110.0, 50.0, 160.0, 80.0));
        assert_eq!(GridLayout::OCR.cell(15), BBox::new(50.0, 90.0, 100.0, 120.0));
    }

    #[test]
    fn test_blank_text_yields_no_words() {
        assert!(synthesize_words(" \n\t ", &GridLayout::OCR).is_empty());
    }
}
