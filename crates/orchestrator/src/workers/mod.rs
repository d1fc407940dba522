//! Concrete pipeline workers, registered in stage order.

mod comparison;
mod extraction;
mod faq;
mod validation;

pub use comparison::ComparisonWorker;
pub use extraction::ExtractionWorker;
pub use faq::FaqWorker;
pub use validation::ValidationWorker;
