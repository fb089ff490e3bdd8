pub mod engine;
pub mod recommendations;
pub mod scoring;
pub mod selection;
pub mod store;
pub mod tokenizer;
