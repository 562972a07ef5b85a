pub mod analyze_frames_use_case;
pub mod annotation_sink;
pub mod engine_config;
pub mod frame_source;
pub mod infrastructure;
pub mod pipeline_error;
pub mod run_logger;
pub mod run_summary;
pub mod sampling_coordinator;
