use std::borrow::Cow;
use std::collections::HashMap;

use crate::account::email::ACTION_TEMPLATE;
use crate::account::errors::EmailSendError;

const ACTION_HTML: &str = include_str!("../../../../templates/mail/verify.html");

/// Renders the HTML body of account emails.
///
/// Placeholders have the form `{{variable}}`. Every value is HTML-escaped
/// except `content`, which carries trusted markup composed by the domain.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        template_name: &str,
        variables: &HashMap<String, String>,
    ) -> Result<String, EmailSendError> {
        let source = match template_name {
            ACTION_TEMPLATE => ACTION_HTML,
            other => return Err(EmailSendError::UnknownTemplate(other.to_string())),
        };

        // Single pass over the template: substituted values are never rescanned.
        let mut html = String::with_capacity(source.len());
        let mut rest = source;
        while let Some(start) = rest.find("{{") {
            let Some(length) = rest[start + 2..].find("}}") else {
                break;
            };
            let key = &rest[start + 2..start + 2 + length];

            html.push_str(&rest[..start]);
            match variables.get(key) {
                Some(value) => html.push_str(&Self::escape(key, value)),
                None => html.push_str(&rest[start..start + length + 4]),
            }
            rest = &rest[start + length + 4..];
        }
        html.push_str(rest);

        Ok(html)
    }

    fn escape<'a>(key: &str, value: &'a str) -> Cow<'a, str> {
        match key {
            "content" => Cow::Borrowed(value),
            "link" => html_escape::encode_double_quoted_attribute(value),
            _ => html_escape::encode_text(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variables(name: &str) -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), name.to_string()),
            ("title".to_string(), "Email verification".to_string()),
            ("content".to_string(), "Welcome aboard!<br>".to_string()),
            (
                "link".to_string(),
                "http://localhost:3000/auth/verify-email?token=abc&x=1".to_string(),
            ),
        ])
    }

    #[test]
    fn test_render_fills_every_placeholder() {
        let html = TemplateRenderer::new()
            .render(ACTION_TEMPLATE, &variables("Alice"))
            .unwrap();

        assert!(html.contains("Hi Alice,"));
        assert!(html.contains("<title>Email verification</title>"));
        assert!(html.contains("Welcome aboard!<br>"));
        assert!(html.contains(r#"href="http://localhost:3000/auth/verify-email?token=abc&amp;x=1""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_escapes_user_supplied_name() {
        let html = TemplateRenderer::new()
            .render(ACTION_TEMPLATE, &variables("<script>alert(1)</script>"))
            .unwrap();

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_placeholders_inside_values_are_not_expanded() {
        let renderer = TemplateRenderer::new();

        for _ in 0..8 {
            let html = renderer
                .render(ACTION_TEMPLATE, &variables("{{link}} {{content}}"))
                .unwrap();

            assert!(html.contains("Hi {{link}} {{content}},"));
            assert_eq!(html.matches("verify-email?token=abc").count(), 1);
            assert_eq!(html.matches("Welcome aboard!").count(), 1);
        }
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let mut vars = variables("Alice");
        vars.remove("title");

        let html = TemplateRenderer::new().render(ACTION_TEMPLATE, &vars).unwrap();

        assert!(html.contains("<title>{{title}}</title>"));
        assert!(html.contains("Hi Alice,"));
    }

    #[test]
    fn test_render_unknown_template() {
        let result = TemplateRenderer::new().render("mail/welcome", &HashMap::new());

        assert!(matches!(result, Err(EmailSendError::UnknownTemplate(name)) if name == "mail/welcome"));
    }
}
