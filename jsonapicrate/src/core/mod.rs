// Query composition: merges the compiled request fragments into one select

pub mod builder;

pub use builder::{Builder, Composed, ComposedQuery, Page, Target};
