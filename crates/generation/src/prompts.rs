use base64::Engine;
use pagewright_core::Attachment;
use tracing::warn;

pub struct GenerationPrompts;

impl GenerationPrompts {
    pub fn system() -> String {
        "You are a front-end developer producing small, self-contained static sites. \
         All markup, styles and scripts go into a single HTML entry file. \
         Respond only with JSON matching the requested schema."
            .to_string()
    }

    pub fn new_project(brief: &str, attachments: &[Attachment]) -> String {
        let mut prompt = format!(
            r#"Build a new single-page static application.

## Brief
{brief}

## Required Output
- `index_html`: the complete application in one HTML file (inline CSS/JS)
- `readme`: a short README.md describing what the page does
- `license`: the full MIT license text
- `commit_message`: one line describing the initial version"#,
        );

        if !attachments.is_empty() {
            prompt.push_str("\n\n## Attachments\n");
            for attachment in attachments {
                prompt.push_str(&render_attachment(attachment));
            }
        }

        prompt
    }

    pub fn update(existing_entry: &str, brief: &str) -> String {
        format!(
            r#"Update an already-deployed single-page application.

## Current entry file
```html
{existing_entry}
```

## Requested change
{brief}

## Instructions
Make the smallest modification that satisfies the request. Keep all
existing functionality, structure and styling that the request does not
ask you to change. Return the complete updated file as `index_html` and a
one-line `commit_message`."#,
        )
    }
}

/// Inline `data:` attachments are decoded into the prompt; anything else
/// is passed by reference.
fn render_attachment(attachment: &Attachment) -> String {
    if let Some(content) = decode_data_uri(&attachment.url) {
        format!("### {} (inline)\n```\n{}\n```\n", attachment.name, content)
    } else {
        format!("### {}\nURL: {}\n", attachment.name, attachment.url)
    }
}

fn decode_data_uri(url: &str) -> Option<String> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;

    if !meta.ends_with(";base64") {
        return Some(payload.to_string());
    }

    match base64::engine::general_purpose::STANDARD.decode(payload) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(_) => {
                warn!("attachment payload is not UTF-8, passing base64 through");
                Some(payload.to_string())
            }
        },
        Err(e) => {
            warn!("failed to decode data URI: {}", e);
            None
        }
    }
}
