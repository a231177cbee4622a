pub mod base_model;
pub mod beta;
pub mod class_probability;
pub mod network;
pub mod segment_map;
pub mod segmenter;
