pub mod blackboard;
pub mod content;
pub mod product;
pub mod report;
pub mod stage;
