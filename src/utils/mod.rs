pub mod convert;
pub mod glyphs;
