use pulldown_cmark::{html, Options, Parser};

/// Render markdown source to an HTML fragment
pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_and_headings() {
        let out = markdown_to_html("# About\n\n*Sooooo simple*.\n");
        assert!(out.contains("<h1>About</h1>"));
        assert!(out.contains("<em>Sooooo simple</em>."));
    }

    #[test]
    fn test_tables_enabled() {
        let out = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(out.contains("<table>"));
    }
}
