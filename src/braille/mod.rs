mod canvas;

pub use canvas::{glyph_for, BrailleCanvas};
