pub mod bbox;
pub mod category;
