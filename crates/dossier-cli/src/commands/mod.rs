pub mod extract;
pub mod normalize;
pub mod ocr;
pub mod rules;
pub mod text_entities;
