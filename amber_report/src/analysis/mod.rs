pub mod completeness_buckets;
pub mod f1_score;
pub mod parameter_grid;
pub mod tool_comparison;
