use crate::config::WidgetConfig;
use crate::models::chat::{ ChatMessage, Role };
use super::{ escape_html, format };

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f8fafc; color: #0f172a; }
.landing { min-height: 100vh; display: flex; align-items: center; justify-content: center; }
.landing .card { max-width: 28rem; text-align: center; background: #fff; padding: 2.5rem;
  border-radius: 1.5rem; border: 1px solid #e2e8f0; box-shadow: 0 10px 30px rgba(15,23,42,.08); }
.landing h1 { margin: 0 0 .5rem; }
.landing p { color: #64748b; }
.cta { display: inline-block; width: 100%; box-sizing: border-box; padding: 1rem; background: #ea580c;
  color: #fff; font-weight: 600; border-radius: 1rem; text-decoration: none; }
header { position: sticky; top: 0; height: 4rem; display: flex; align-items: center; gap: .75rem;
  padding: 0 1rem; background: #fff; border-bottom: 1px solid #e2e8f0; }
header .back { text-decoration: none; color: #475569; font-size: 1.25rem; }
header h2 { margin: 0; font-size: 1rem; }
header .status { font-size: .7rem; color: #22c55e; }
main { max-width: 42rem; margin: 0 auto; padding: 1rem; display: flex; flex-direction: column; gap: 1rem; }
.bubble { max-width: 85%; padding: 1rem; border-radius: 1rem; font-size: .9rem; line-height: 1.5; }
.bubble.user { align-self: flex-end; background: #ea580c; color: #fff; }
.bubble.assistant { align-self: flex-start; background: #fff; border: 1px solid #e2e8f0; }
.bubble .meta { display: flex; gap: .5rem; align-items: center; margin-top: .5rem; font-size: .65rem; opacity: .7; }
.bubble .meta form { display: inline; margin: 0; }
.bubble .meta button { border: 0; background: none; cursor: pointer; font-size: .65rem; color: inherit; }
.code-block { background: #0f172a; color: #f1f5f9; padding: .75rem; border-radius: .75rem;
  font-size: .75rem; overflow-x: auto; }
.typing { align-self: flex-start; color: #94a3b8; font-size: .8rem; }
footer { position: sticky; bottom: 0; padding: 1rem; background: #fff; border-top: 1px solid #e2e8f0; }
footer form { max-width: 42rem; margin: 0 auto; display: flex; gap: .5rem; }
footer input[type=text] { flex: 1; padding: .75rem 1rem; border: 1px solid #e2e8f0; border-radius: 1rem; }
footer button { padding: .75rem 1.25rem; background: #ea580c; color: #fff; border: 0;
  border-radius: 1rem; cursor: pointer; }
footer button:disabled, footer input:disabled { opacity: .5; }
.watermark { text-align: center; font-size: .65rem; color: #94a3b8; padding: .5rem 0 0; }
.watermark a { color: inherit; }
"#;

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

/// The landing screen: title, tagline, and a single call to action.
pub fn landing_page(config: &WidgetConfig) -> String {
    let body = format!(
        "<div class=\"landing\"><div class=\"card\">\n\
         <h1>{title}</h1>\n<p>{tagline}</p>\n\
         <a class=\"cta\" href=\"/chat\">{cta}</a>\n\
         </div></div>",
        title = escape_html(&config.title),
        tagline = escape_html(&config.tagline),
        cta = escape_html(&config.cta_label)
    );
    page_shell(&escape_html(&config.title), &body)
}

/// The chat screen: header with back navigation, the message list, a typing
/// indicator while a dispatch is in flight, and the input-plus-send footer.
pub fn chat_page(config: &WidgetConfig, messages: &[ChatMessage], busy: bool) -> String {
    let mut list = String::new();
    for message in messages {
        // System instructions are context for the endpoint, not chat content.
        if message.role == Role::System {
            continue;
        }
        list.push_str(&render_message(message));
    }

    if busy {
        list.push_str("<div class=\"typing\">&#8226;&#8226;&#8226;</div>\n");
    }

    let disabled = if busy { " disabled" } else { "" };
    let watermark = match &config.watermark_text {
        Some(text) =>
            match &config.watermark_link {
                Some(link) =>
                    format!(
                        "<div class=\"watermark\"><a href=\"{}\" target=\"_blank\" rel=\"noreferrer\">{}</a></div>\n",
                        escape_html(link),
                        escape_html(text)
                    ),
                None => format!("<div class=\"watermark\">{}</div>\n", escape_html(text)),
            }
        None => String::new(),
    };

    let body = format!(
        "<header>\n<a class=\"back\" href=\"/home\" title=\"Back\">&#8592;</a>\n\
         <h2>{title}</h2>\n<span class=\"status\">&#9679; Online</span>\n</header>\n\
         <main>\n{list}</main>\n\
         <footer>\n<form method=\"post\" action=\"/chat/send\">\n\
         <input type=\"text\" name=\"message\" placeholder=\"{placeholder}\" autofocus{disabled}>\n\
         <button type=\"submit\"{disabled}>Send</button>\n</form>\n{watermark}</footer>\n\
         <script>window.scrollTo(0, document.body.scrollHeight);</script>",
        title = escape_html(&config.title),
        placeholder = escape_html(&config.placeholder)
    );
    page_shell(&escape_html(&config.title), &body)
}

fn render_message(message: &ChatMessage) -> String {
    let class = match message.role {
        Role::User => "user",
        _ => "assistant",
    };
    format!(
        "<div class=\"bubble {class}\">\n<div>{content}</div>\n\
         <div class=\"meta\"><span>{time}</span>\n\
         <form method=\"post\" action=\"/chat/delete\">\n\
         <input type=\"hidden\" name=\"id\" value=\"{id}\">\n\
         <button type=\"submit\" title=\"Delete message\">&#10005;</button>\n\
         </form></div>\n</div>\n",
        content = format(&message.content),
        time = escape_html(&message.time),
        id = message.id
    )
}
