pub mod clip_splitter;
pub mod frame_sampler;
pub mod mosaic_composer;
pub mod pipeline;
pub mod scene_segmenter;
pub mod summarizer;
pub mod timeline_assembler;
