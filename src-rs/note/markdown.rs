/// Converts already-extracted article HTML to Markdown.
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    html2md::parse_html(html).trim().to_string()
}
