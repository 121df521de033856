//! HTML templates
//!
//! Tera templates are compiled into the binary from `templates/`. Any file in
//! the configured override directory with the same relative name replaces the
//! embedded one, and new files are added alongside.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use rust_embed::RustEmbed;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera, Value};

use crate::models::User;

mod error;

pub use error::ThemeError;

/// Template rendered for server errors
pub const SERVER_ERROR_TEMPLATE: &str = "pages/500.html";

/// Template rendered for unknown paths
pub const NOT_FOUND_TEMPLATE: &str = "pages/404.html";

#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct EmbeddedTemplates;

pub struct ThemeEngine {
    tera: Tera,
    override_path: Option<PathBuf>,
}

impl ThemeEngine {
    /// Load the embedded templates, then the overrides under `override_path`
    /// (a missing directory is not an error).
    pub fn new(override_path: &Path) -> Result<Self> {
        let override_path = Some(override_path.to_path_buf());
        let tera = Self::load(override_path.as_deref())?;
        Ok(Self { tera, override_path })
    }

    /// Only the templates compiled into the binary
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            tera: Self::load(None)?,
            override_path: None,
        })
    }

    /// Re-read the override directory
    pub fn reload(&mut self) -> Result<()> {
        self.tera = Self::load(self.override_path.as_deref())?;
        tracing::info!("Reloaded {} templates", self.tera.get_template_names().count());
        Ok(())
    }

    fn load(override_path: Option<&Path>) -> Result<Tera> {
        let mut templates: HashMap<String, String> = HashMap::new();

        for name in EmbeddedTemplates::iter() {
            let Some(file) = EmbeddedTemplates::get(&name) else {
                continue;
            };
            let content = String::from_utf8(file.data.into_owned())
                .with_context(|| format!("Embedded template {} is not UTF-8", name))?;
            templates.insert(name.into_owned(), content);
        }

        if let Some(dir) = override_path.filter(|dir| dir.is_dir()) {
            let mut overrides = Vec::new();
            collect_templates_from_dir(dir, dir, &mut overrides)?;
            for (name, content) in overrides {
                tracing::debug!("Template override: {}", name);
                templates.insert(name, content);
            }
        }

        let mut tera = Tera::default();
        // add_raw_templates resolves inheritance across the whole batch.
        tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())
            .map_err(|e| ThemeError::TemplateError(error_chain(&e)))?;
        tera.register_filter("linebreaksbr", linebreaksbr);
        Ok(tera)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        if !self.has_template(template) {
            return Err(ThemeError::NotFound(template.to_string()).into());
        }
        self.tera
            .render(template, context)
            .map_err(|e| ThemeError::TemplateError(error_chain(&e)).into())
    }

    /// Render `template`, falling back to the server error page and finally
    /// to a static page when templates themselves are broken.
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {:#}", template, e);
                self.render_server_error(context)
            }
        }
    }

    /// The server error page, or a static page if that fails too
    pub fn render_server_error(&self, context: &TeraContext) -> String {
        self.render(SERVER_ERROR_TEMPLATE, context).unwrap_or_else(|e| {
            tracing::warn!("Failed to render error template: {:#}", e);
            simple_error_page()
        })
    }
}

fn error_chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

fn collect_templates_from_dir(base: &Path, current: &Path, templates: &mut Vec<(String, String)>) -> Result<()> {
    for entry in fs::read_dir(current).map_err(ThemeError::from)? {
        let path = entry.map_err(ThemeError::from)?.path();

        if path.is_dir() {
            collect_templates_from_dir(base, &path, templates)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let name = path
                .strip_prefix(base)
                .context("Template outside of override directory")?
                .to_string_lossy()
                .replace('\\', "/");
            let content =
                fs::read_to_string(&path).with_context(|| format!("Failed to read template: {:?}", path))?;
            templates.push((name, content));
        }
    }
    Ok(())
}

/// Escape text and turn newlines into `<br>`. Use with `| safe`.
fn linebreaksbr(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let html = tera::escape_html(&text).replace("\r\n", "\n").replace('\n', "<br>");
    Ok(Value::String(html))
}

fn simple_error_page() -> String {
    r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Server error</title></head>
<body>
    <h1>Server error</h1>
    <p>Something went wrong. Please try again later.</p>
</body>
</html>"#
        .to_string()
}

/// Variables every page template receives
#[derive(Debug, Clone, Serialize)]
pub struct PageVars {
    pub current_user: Option<CurrentUser>,
    pub request_path: String,
    /// For the footer
    pub year: i32,
}

/// The signed-in user as templates see it
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin(),
        }
    }
}

impl PageVars {
    pub fn new(request_path: impl Into<String>, user: Option<&User>, now: DateTime<Utc>) -> Self {
        Self {
            current_user: user.map(CurrentUser::from),
            request_path: request_path.into(),
            year: now.year(),
        }
    }

    /// A fresh Tera context holding these variables
    pub fn context(&self) -> TeraContext {
        let mut context = TeraContext::new();
        context.insert("current_user", &self.current_user);
        context.insert("request_path", &self.request_path);
        context.insert("year", &self.year);
        context
    }
}

#[cfg(test)]
mod tests;
