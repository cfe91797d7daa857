pub mod predictor;

pub use predictor::ILocationPredictor;
