// Note composition: Markdown conversion and Obsidian destinations

pub mod markdown;
pub mod obsidian;

pub use markdown::html_to_markdown;
pub use obsidian::{build_obsidian_uri, compose_note, generate_frontmatter, sanitize_file_name};
