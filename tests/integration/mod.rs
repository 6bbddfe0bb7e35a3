//! Integration tests for the wireframe-to-code pipeline

mod config_integration;
mod detection_to_prompt;
mod model_providers;
mod pipeline_end_to_end;
mod response_extraction;
mod test_utils;
