pub mod csv_loader;
pub mod frame_pipeline;
pub mod joint_normalizer;
pub mod letter_classifier;
pub mod letter_stabilizer;
pub mod rate_smoother;
pub mod resource_monitor;
pub mod spell_corrector;
pub mod types;
