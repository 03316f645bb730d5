use crate::clip::frontmatter::{parse_structured, Category};
use crate::config::ObsidianConfig;
use crate::note::markdown::html_to_markdown;
use crate::note::obsidian::{
    build_obsidian_uri, compose_note, generate_frontmatter, note_path, sanitize_file_name, NoteFrontmatter,
};
use chrono::{TimeZone, Utc};

#[cfg(test)]
mod tests {
    use super::*;

    fn clipped_at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn sanitize_replaces_illegal_characters_and_collapses_spaces() {
        assert_eq!(sanitize_file_name("a/b:c*d?\"e<f>g|h\\i"), "a-b-c-d--e-f-g-h-i");
        assert_eq!(sanitize_file_name("  Hello   \t world \n"), "Hello world");
    }

    #[test]
    fn sanitize_caps_length_in_characters() {
        let long = "語".repeat(150);
        assert_eq!(sanitize_file_name(&long).chars().count(), 100);
    }

    #[test]
    fn note_path_prefixes_folder() {
        let config = ObsidianConfig {
            vault: String::new(),
            folder: "/Clips/Web/".to_string(),
            tags: vec![],
        };
        assert_eq!(note_path(&config, "My: Note"), "Clips/Web/My- Note");
        assert_eq!(note_path(&ObsidianConfig::default(), "x"), "x");
    }

    #[test]
    fn obsidian_uri_encodes_file_vault_and_content() {
        let config = ObsidianConfig {
            vault: "My Vault".to_string(),
            folder: "Clips".to_string(),
            tags: vec![],
        };
        let uri = build_obsidian_uri(&config, "Hello World", "# Hi & bye");
        assert_eq!(
            uri,
            "obsidian://new?file=Clips%2FHello%20World&vault=My%20Vault&content=%23%20Hi%20%26%20bye"
        );
    }

    #[test]
    fn obsidian_uri_omits_empty_vault() {
        let uri = build_obsidian_uri(&ObsidianConfig::default(), "T", "c");
        assert_eq!(uri, "obsidian://new?file=T&content=c");
    }

    #[test]
    fn frontmatter_lists_source_time_and_tags() {
        let tags = vec!["web".to_string(), " ".to_string(), "ai".to_string()];
        let text = generate_frontmatter("https://example.com/a", Some("Ann"), &tags, clipped_at());
        assert_eq!(
            text,
            "---\nsource: \"https://example.com/a\"\nclipped_at: \"2024-05-01T08:30:00.000Z\"\nauthor: \"Ann\"\ntags: [\"web\", \"ai\"]\n---\n"
        );
    }

    #[test]
    fn frontmatter_escapes_quotes() {
        let text = NoteFrontmatter {
            title: Some("Say \"hi\""),
            ..NoteFrontmatter::new("u", clipped_at())
        }
        .render();
        assert!(text.contains("title: \"Say \\\"hi\\\"\""));
    }

    #[test]
    fn compose_note_carries_model_metadata() {
        let parsed = parse_structured("---\ntitle: Foo\ncategory: tool\nsummary: Short\n---\n\nHello world\n");
        assert_eq!(parsed.category, Some(Category::Tool));
        let obsidian = ObsidianConfig {
            vault: String::new(),
            folder: String::new(),
            tags: vec!["clip".to_string()],
        };

        let note = compose_note(&parsed, "https://example.com", &obsidian, clipped_at());
        assert!(note.starts_with("---\nsource: \"https://example.com\"\n"));
        assert!(note.contains("title: \"Foo\"\ncategory: \"tool\"\nsummary: \"Short\"\ntags: [\"clip\"]\n---\n"));
        assert!(note.ends_with("---\n\nHello world"));
    }

    #[test]
    fn html_is_converted_to_markdown() {
        assert_eq!(html_to_markdown("   "), "");
        let md = html_to_markdown("<h1>Title</h1><p>Some <strong>bold</strong> text</p>");
        assert!(md.contains("Title"));
        assert!(md.contains("**bold**"));
    }
}
