pub mod gist;

pub use gist::{GistStore, extract_gist_id};
