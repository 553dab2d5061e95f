use super::RenderError;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_TEMPLATE: &str = "report.html";

const BUILTIN_REPORT: &str = include_str!("../../templates/report.html");

/// Loaded templates, keyed by file name.
///
/// Lookups try `template_dir` first and fall back to the built-in report
/// template. Whatever is found is kept for the life of the cache.
#[derive(Debug, Default)]
pub struct TemplateCache {
    template_dir: Option<PathBuf>,
    loaded: HashMap<String, String>,
}

impl TemplateCache {
    pub fn new(template_dir: Option<PathBuf>) -> Self {
        Self {
            template_dir,
            loaded: HashMap::new(),
        }
    }

    pub fn get(&mut self, name: &str) -> Result<&str, RenderError> {
        if !self.loaded.contains_key(name) {
            let template = self.load(name)?;
            self.loaded.insert(name.to_string(), template);
        }
        self.loaded
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Drop everything loaded so edited templates are picked up
    pub fn clear(&mut self) {
        self.loaded.clear();
    }

    fn load(&self, name: &str) -> Result<String, RenderError> {
        if let Some(dir) = &self.template_dir {
            let path = dir.join(name);
            if path.is_file() {
                debug!(path = %path.display(), "Loading template from disk");
                return Ok(std::fs::read_to_string(path)?);
            }
        }
        if name == DEFAULT_TEMPLATE {
            return Ok(BUILTIN_REPORT.to_string());
        }
        Err(RenderError::TemplateNotFound(name.to_string()))
    }
}

/// Replace `{{name}}` placeholders; unknown names render as empty
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                if let Some((_, value)) = values.iter().find(|(key, _)| *key == name) {
                    out.push_str(value);
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
