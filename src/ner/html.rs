// html.rs - HTML rendering of recognition results

use crate::ner::filters::NamedEntity;

const XHTML_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN"
 "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>NER</title></head>
<body><div>%s</div></body>
</html>
"#;

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn anchor(uri: &str, text: &str, html_class: Option<&str>) -> String {
    match html_class {
        Some(class) => format!(
            "<a href=\"{}\" class=\"{}\">{}</a>",
            escape_attribute(uri),
            escape_attribute(class),
            text
        ),
        None => format!("<a href=\"{}\">{}</a>", escape_attribute(uri), text),
    }
}

/// Check that a generated fragment stays well-formed once inlined: the span
/// text must not carry markup of its own.
fn span_is_safe(text: &str) -> bool {
    !text.contains('<') && !text.contains('>') && !text.contains('&')
}

/// Replace each recognized span with `<a href="URI"[ class="C"]>text</a>`.
/// Replacements run right to left so earlier offsets stay valid; overlapping
/// matches keep only the first seen.
pub struct NerHtmlPrettyPrint;

impl NerHtmlPrettyPrint {
    pub fn pretty_print(
        &self,
        text: &str,
        named_entities: &[NamedEntity],
        html_class: Option<&str>,
    ) -> String {
        render(text, named_entities, html_class, false)
    }
}

/// Strict-XHTML variant: the document is wrapped in a fixed XHTML template,
/// and a span whose fragment would break well-formedness is emitted
/// verbatim instead of being linked.
pub struct NerValidXhtmlPrettyPrint;

impl NerValidXhtmlPrettyPrint {
    pub fn pretty_print(
        &self,
        text: &str,
        named_entities: &[NamedEntity],
        html_class: Option<&str>,
    ) -> String {
        let body = render(text, named_entities, html_class, true);
        XHTML_TEMPLATE.replace("%s", &body)
    }
}

fn render(
    text: &str,
    named_entities: &[NamedEntity],
    html_class: Option<&str>,
    validate: bool,
) -> String {
    let chars: Vec<char> = text.chars().collect();
    // right-to-left, first match wins on overlap
    let mut spans: Vec<(usize, usize, &str)> = named_entities
        .iter()
        .map(|(uri, _, token)| (token.start, token.end, uri.as_str()))
        .collect();
    spans.sort_by(|a, b| a.0.cmp(&b.0));
    spans.dedup_by_key(|span| span.0);

    let mut out: Vec<String> = Vec::new();
    let mut cursor = 0;
    for (start, end, uri) in spans {
        if start < cursor || end > chars.len() {
            continue;
        }
        out.push(chars[cursor..start].iter().collect());
        let span_text: String = chars[start..end].iter().collect();
        if validate && !span_is_safe(&span_text) {
            out.push(span_text);
        } else {
            out.push(anchor(uri, &span_text, html_class));
        }
        cursor = end;
    }
    out.push(chars[cursor..].iter().collect());
    out.concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::tokenizer::{Sentence, Token};

    fn entity(uri: &str, word: &str, start: usize) -> NamedEntity {
        (
            uri.to_string(),
            None,
            Token::new(
                word,
                start,
                start + word.chars().count(),
                Sentence {
                    index: 0,
                    start: 0,
                    end: 100,
                },
            ),
        )
    }

    #[test]
    fn test_pretty_print() {
        let text = "Hello everyone, this is me.";
        let entities = vec![
            entity("http://example.com/everyone", "everyone", 6),
            entity("http://example.com/me", "me", 24),
        ];
        let html = NerHtmlPrettyPrint.pretty_print(text, &entities, None);
        assert_eq!(
            html,
            "Hello <a href=\"http://example.com/everyone\">everyone</a>, this is \
             <a href=\"http://example.com/me\">me</a>."
        );
    }

    #[test]
    fn test_pretty_print_with_class() {
        let text = "me";
        let entities = vec![entity("http://example.com/me", "me", 0)];
        let html = NerHtmlPrettyPrint.pretty_print(text, &entities, Some("ner"));
        assert_eq!(
            html,
            "<a href=\"http://example.com/me\" class=\"ner\">me</a>"
        );
    }

    #[test]
    fn test_xhtml_wraps_document() {
        let text = "me";
        let entities = vec![entity("http://example.com/me", "me", 0)];
        let html = NerValidXhtmlPrettyPrint.pretty_print(text, &entities, None);
        assert!(html.starts_with("<?xml"));
        assert!(html.contains("<a href=\"http://example.com/me\">me</a>"));
        assert!(html.contains("xhtml1-strict.dtd"));
    }

    #[test]
    fn test_xhtml_rejects_unsafe_span() {
        let text = "a <b> c";
        let entities = vec![entity("http://example.com/b", "<b>", 2)];
        let html = NerValidXhtmlPrettyPrint.pretty_print(text, &entities, None);
        // the span is emitted verbatim, not linked
        assert!(!html.contains("<a href=\"http://example.com/b\">"));
        assert!(html.contains("<b>"));
    }
}
