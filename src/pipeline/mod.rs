pub mod pipeline;
pub mod counters;
pub mod feedback;
