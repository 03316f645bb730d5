
#[cfg(test)]
pub mod clip {
    pub mod frontmatter;
    pub mod manager;
    pub mod pipeline;
}

#[cfg(test)]
pub mod llm {
    pub mod models {
        pub mod claude;
        pub mod gemini;
        pub mod openai;
        pub mod provider_handle;
    }
    pub mod utils {
        pub mod sse;
    }
}

#[cfg(test)]
pub mod note {
    pub mod obsidian;
}
