pub mod cancel;
pub mod estimator;

pub use cancel::CancelHandle;
pub use estimator::Estimator;
