pub mod page;

/// Escape the three HTML metacharacters. `&` goes first so entities produced
/// by the other replacements are not double-escaped.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Turn raw message text into inert display markup: escape, newline to
/// `<br>`, and triple-backtick fences to `<pre>` blocks. Not a Markdown
/// renderer: no inline formatting, lists, or links.
pub fn format(text: &str) -> String {
    let content = escape_html(text).replace('\n', "<br>");

    if content.contains("```") {
        expand_code_fences(&content)
    } else {
        content
    }
}

/// Replace each pair of ``` fences with a preformatted block wrapping the
/// trimmed inner text. An unterminated fence is left to render literally.
fn expand_code_fences(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        let Some(end) = after.find("```") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str("<pre class=\"code-block\">");
        out.push_str(trim_fence(&after[..end]));
        out.push_str("</pre>");
        rest = &after[end + 3..];
    }

    out.push_str(rest);
    out
}

/// Trim leading/trailing whitespace from fence content. Newlines were
/// already rewritten to `<br>` by this point, so those count as whitespace
/// here too.
fn trim_fence(mut inner: &str) -> &str {
    loop {
        let trimmed = inner.trim();
        if let Some(rest) = trimmed.strip_prefix("<br>") {
            inner = rest;
            continue;
        }
        if let Some(rest) = trimmed.strip_suffix("<br>") {
            inner = rest;
            continue;
        }
        return trimmed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(format("hello world"), "hello world");
    }

    #[test]
    fn metacharacters_are_escaped() {
        assert_eq!(format("a&b"), "a&amp;b");
        assert_eq!(format("<script>"), "&lt;script&gt;");
        assert_eq!(format("1 < 2 && 3 > 2"), "1 &lt; 2 &amp;&amp; 3 &gt; 2");
    }

    #[test]
    fn newlines_become_line_breaks() {
        assert_eq!(format("line one\nline two"), "line one<br>line two");
    }

    #[test]
    fn fenced_span_becomes_preformatted_block() {
        assert_eq!(format("```x```"), "<pre class=\"code-block\">x</pre>");
    }

    #[test]
    fn fence_content_is_trimmed() {
        assert_eq!(
            format("before ```\nlet x = 1;\n``` after"),
            "before <pre class=\"code-block\">let x = 1;</pre> after"
        );
    }

    #[test]
    fn fence_content_is_escaped() {
        assert_eq!(
            format("```a < b```"),
            "<pre class=\"code-block\">a &lt; b</pre>"
        );
    }

    #[test]
    fn multiple_fences_each_get_a_block() {
        let markup = format("```one``` and ```two```");
        assert_eq!(markup.matches("<pre").count(), 2);
        assert!(markup.contains(">one</pre>"));
        assert!(markup.contains(">two</pre>"));
    }

    #[test]
    fn unterminated_fence_renders_literally() {
        assert_eq!(format("```dangling"), "```dangling");
    }

    #[test]
    fn interior_line_breaks_survive_inside_fences() {
        assert_eq!(
            format("```a\nb```"),
            "<pre class=\"code-block\">a<br>b</pre>"
        );
    }
}
