// Formatting rule set: typed schema, fallback values, and normalization of
// model output into that schema.

pub mod measure;
pub mod normalize;
pub mod schema;

pub use measure::Measure;
pub use normalize::normalize;
pub use schema::RuleSet;
