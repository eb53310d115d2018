use std::path::PathBuf;

use anyhow::{bail, Result};
use bamboo::core::template::{field_types, FieldKind, HabitTemplate, TemplateField, TemplateStore};
use bamboo::core::terminal;
use colored::*;

use super::{open_vault, print_title};

pub fn list(vault: Option<PathBuf>, json: bool) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = TemplateStore::new(&paths);

    let mut templates = Vec::new();
    for name in store.list_templates()? {
        if let Some(template) = store.load(&name)? {
            templates.push(template);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    print_title("Habit Templates");
    if templates.is_empty() {
        println!("{}", "No templates found. Create one with `bamboo templates create <name>`.".yellow());
        return Ok(());
    }
    for template in &templates {
        println!(
            "  {} {}",
            template.name.cyan(),
            format!("[{} fields]", template.fields.len()).dimmed()
        );
    }
    Ok(())
}

pub fn show(vault: Option<PathBuf>, name: &str) -> Result<()> {
    let paths = open_vault(vault)?;
    let template = load_existing(&TemplateStore::new(&paths), name)?;
    print_template(&template);
    Ok(())
}

pub fn create(vault: Option<PathBuf>, name: &str) -> Result<()> {
    let paths = open_vault(vault)?;
    let template = TemplateStore::new(&paths).create(name)?;
    super::ok(&format!("Created template: {}", name));
    println!();
    print_template(&template);
    Ok(())
}

pub fn delete(vault: Option<PathBuf>, name: &str, yes: bool) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = TemplateStore::new(&paths);
    if !store.exists(name) {
        bail!("Template '{}' does not exist", name);
    }
    if !yes && !terminal::confirm(&format!("Delete template '{}'?", name))? {
        println!("{}", "Cancelled".yellow());
        return Ok(());
    }
    store.delete(name)?;
    super::ok(&format!("Deleted template: {}", name));
    Ok(())
}

pub struct NewField<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    pub unit: Option<String>,
    pub options: Vec<String>,
    pub required: bool,
}

pub fn add_field(vault: Option<PathBuf>, template: &str, field: NewField<'_>) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = TemplateStore::new(&paths);
    let mut loaded = load_existing(&store, template)?;

    loaded.add_field(TemplateField {
        unit: field.unit,
        options: field.options,
        required: field.required,
        ..TemplateField::new(field.name, FieldKind::parse(field.kind)?)
    })?;
    store.save(&loaded)?;
    super::ok(&format!("Added field '{}' to {}", field.name.trim(), template));
    Ok(())
}

pub fn remove_field(vault: Option<PathBuf>, template: &str, number: usize) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = TemplateStore::new(&paths);
    let mut loaded = load_existing(&store, template)?;

    let removed = match number.checked_sub(1).and_then(|i| loaded.remove_field(i)) {
        Some(field) => field,
        None => bail!("No field #{} in template '{}'", number, template),
    };
    store.save(&loaded)?;
    super::ok(&format!("Removed field '{}' from {}", removed.name, template));
    Ok(())
}

pub fn types() -> Result<()> {
    print_title("Field Types");
    for (kind, label, description) in field_types() {
        println!("  {:<6} {:<6} {}", kind.as_str().cyan(), label, description.dimmed());
    }
    Ok(())
}

fn load_existing(store: &TemplateStore<'_>, name: &str) -> Result<HabitTemplate> {
    match store.load(name)? {
        Some(template) => Ok(template),
        None => bail!("Template '{}' does not exist", name),
    }
}

fn print_template(template: &HabitTemplate) {
    print_title(&format!("Template: {}", template.name));
    if !template.description.is_empty() {
        println!("{}", template.description.dimmed());
        println!();
    }
    for (i, field) in template.fields.iter().enumerate() {
        let mut detail = field.kind.as_str().to_string();
        if let Some(unit) = &field.unit {
            detail.push_str(&format!(", {}", unit));
        }
        if !field.options.is_empty() {
            detail.push_str(&format!(", {}", field.options.join(" / ")));
        }
        let required = if field.required {
            " required".red().to_string()
        } else {
            String::new()
        };
        println!("{:>3}. {} ({}){}", i + 1, field.name, detail, required);
    }
}
