pub mod escape;

pub use escape::{escape, unescape, unescape_to_string};
