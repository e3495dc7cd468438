pub mod model_service;
pub mod quiz_generator;
pub mod quiz_service;
