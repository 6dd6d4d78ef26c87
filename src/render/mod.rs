pub mod blend;
pub mod compose;
pub mod pipeline;
