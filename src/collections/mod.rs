mod array;

pub use array::ArraySchema;
