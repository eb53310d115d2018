//! Habit log templates.
//!
//! A template is a markdown file whose YAML frontmatter holds the field list;
//! the body is a readable preview regenerated on every save.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{validate_name, BambooError, Result};
use super::paths::VaultPaths;
use super::task_store::write_replacing;

pub const TEMPLATE_SUFFIX: &str = ".template.md";

lazy_static! {
    static ref FRONTMATTER_RE: Regex = Regex::new(r"(?s)^---\r?\n(.*?)\r?\n---").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Time,
    Pages,
    Mood,
    Notes,
    Mcq,
}

impl FieldKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "pages" => Ok(Self::Pages),
            "mood" => Ok(Self::Mood),
            "notes" => Ok(Self::Notes),
            "mcq" => Ok(Self::Mcq),
            _ => Err(BambooError::Parse {
                input: s.to_string(),
                expected: "field type (time|pages|mood|notes|mcq)",
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Pages => "pages",
            Self::Mood => "mood",
            Self::Notes => "notes",
            Self::Mcq => "mcq",
        }
    }
}

/// (kind, display name, description) for every supported field type.
pub fn field_types() -> Vec<(FieldKind, &'static str, &'static str)> {
    vec![
        (FieldKind::Time, "Time", "Time duration with unit"),
        (FieldKind::Pages, "Pages", "Page count with unit"),
        (FieldKind::Mood, "Mood", "Mood scale 1-10"),
        (FieldKind::Notes, "Notes", "Free text notes"),
        (FieldKind::Mcq, "MCQ", "Multiple choice question"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl TemplateField {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            unit: None,
            options: Vec::new(),
            required: false,
        }
    }

    fn render(&self) -> String {
        let heading = if self.required {
            format!("## {} (required)", self.name)
        } else {
            format!("## {}", self.name)
        };
        let line = match self.kind {
            FieldKind::Time => format!(
                "- {}: [Enter {}]",
                self.name,
                self.unit.as_deref().unwrap_or("minutes")
            ),
            FieldKind::Pages => format!(
                "- {}: [Enter {}]",
                self.name,
                self.unit.as_deref().unwrap_or("pages")
            ),
            FieldKind::Mood => format!("- {} (1-10): [Enter rating]", self.name),
            FieldKind::Notes => "- [Add notes]".to_string(),
            FieldKind::Mcq => format!(
                "- {}: [Choose one: {}]",
                self.name,
                self.options.join(" / ")
            ),
        };
        format!("{}\n{}\n", heading, line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
}

impl HabitTemplate {
    /// Duration (required, minutes) and Notes.
    pub fn default_for(name: &str) -> Self {
        let mut duration = TemplateField::new("Duration", FieldKind::Time);
        duration.unit = Some("minutes".to_string());
        duration.required = true;

        Self {
            name: name.to_string(),
            description: format!("Template for {} habit", name),
            fields: vec![duration, TemplateField::new("Notes", FieldKind::Notes)],
        }
    }

    pub fn add_field(&mut self, field: TemplateField) -> Result<()> {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(BambooError::validation("Field name cannot be empty"));
        }
        if self.fields.iter().any(|f| f.name.eq_ignore_ascii_case(name)) {
            return Err(BambooError::validation(format!(
                "Field '{}' already exists in template '{}'",
                name, self.name
            )));
        }
        if field.kind == FieldKind::Mcq && field.options.len() < 2 {
            return Err(BambooError::validation(
                "Multiple choice fields need at least two options",
            ));
        }
        self.fields.push(TemplateField {
            name: name.to_string(),
            ..field
        });
        Ok(())
    }

    pub fn remove_field(&mut self, index: usize) -> Option<TemplateField> {
        if index < self.fields.len() {
            Some(self.fields.remove(index))
        } else {
            None
        }
    }

    /// The per-field sections of a detailed habit log.
    pub fn render_log_sections(&self) -> String {
        self.fields
            .iter()
            .map(TemplateField::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_markdown(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self).map_err(|source| BambooError::Template {
            path: self.name.clone().into(),
            source,
        })?;
        let mut out = format!("---\n{}---\n\n# {} template\n\n", yaml, self.name);
        if !self.description.is_empty() {
            out.push_str(&self.description);
            out.push_str("\n\n");
        }
        out.push_str(&self.render_log_sections());
        Ok(out)
    }

    pub fn from_markdown(path: &Path, content: &str) -> Result<Self> {
        let raw = FRONTMATTER_RE
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| {
                BambooError::validation(format!(
                    "Template {} has no frontmatter",
                    path.display()
                ))
            })?;
        serde_yaml::from_str(raw).map_err(|source| BambooError::Template {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub struct TemplateStore<'a> {
    paths: &'a VaultPaths,
}

impl<'a> TemplateStore<'a> {
    pub fn new(paths: &'a VaultPaths) -> Self {
        Self { paths }
    }

    pub fn list_templates(&self) -> Result<Vec<String>> {
        let dir = &self.paths.habit_templates;
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BambooError::storage(dir, e)),
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| {
                e.file_name()
                    .to_str()
                    .and_then(|n| n.strip_suffix(TEMPLATE_SUFFIX))
                    .filter(|n| !n.is_empty() && !n.starts_with('.'))
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// False for names that could not have been created.
    pub fn exists(&self, name: &str) -> bool {
        validate_name("Template", name).is_ok() && self.paths.habit_template(name).is_file()
    }

    pub fn load(&self, name: &str) -> Result<Option<HabitTemplate>> {
        validate_name("Template", name)?;
        let path = self.paths.habit_template(name);
        match fs::read_to_string(&path) {
            Ok(content) => HabitTemplate::from_markdown(&path, &content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BambooError::storage(path, e)),
        }
    }

    pub fn create(&self, name: &str) -> Result<HabitTemplate> {
        validate_name("Template", name)?;
        if self.exists(name) {
            return Err(BambooError::validation(format!(
                "Template '{}' already exists",
                name
            )));
        }
        let template = HabitTemplate::default_for(name);
        self.save(&template)?;
        Ok(template)
    }

    pub fn save(&self, template: &HabitTemplate) -> Result<()> {
        validate_name("Template", &template.name)?;
        let dir = &self.paths.habit_templates;
        fs::create_dir_all(dir).map_err(|e| BambooError::storage(dir, e))?;

        let path = self.paths.habit_template(&template.name);
        write_replacing(&path, &template.to_markdown()?)?;
        info!(path = %path.display(), fields = template.fields.len(), "saved template");
        Ok(())
    }

    /// Returns false when there was nothing to delete.
    pub fn delete(&self, name: &str) -> Result<bool> {
        validate_name("Template", name)?;
        let path = self.paths.habit_template(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "deleted template");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "template already gone");
                Ok(false)
            }
            Err(e) => Err(BambooError::storage(path, e)),
        }
    }
}
