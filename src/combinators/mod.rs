mod refine;

pub use refine::{Check, Refinement};
