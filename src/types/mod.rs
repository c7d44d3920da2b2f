//! PackStream value model.

mod eq;
mod value;

pub use value::{Null, Structure, Value, ValueMap};
