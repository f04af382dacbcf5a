pub mod element;

pub use element::{is_valid_name, Element, Grouping, Payload};
