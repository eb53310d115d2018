use std::path::PathBuf;

use anyhow::{anyhow, Result};
use bamboo::core::config::DEFAULT_VAULT_NAME;
use bamboo::core::paths::VaultPaths;
use bamboo::core::settings;
use colored::*;

use super::{print_title, resolver};

/// Creates (or repairs) a vault and makes it the active one.
pub fn run(vault: Option<PathBuf>, name: Option<String>, path: Option<PathBuf>) -> Result<()> {
    let resolver = resolver(vault)?;

    let root = match path.or_else(|| resolver.resolve()) {
        Some(root) => root,
        None => {
            let home = resolver
                .source()
                .home()
                .ok_or_else(|| anyhow!("Cannot determine home directory; pass --path"))?;
            home.join(name.as_deref().unwrap_or(DEFAULT_VAULT_NAME))
        }
    };
    let root = settings::absolute_path(&root)?;
    let name = name.unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_VAULT_NAME.to_string())
    });

    print_title("Bamboo Vault Setup");
    println!("{}", "Checking vault folders...".cyan());
    println!();

    let paths = VaultPaths::from_root(root.clone());
    let missing: Vec<bool> = paths
        .required_folders()
        .iter()
        .map(|(dir, _)| !dir.exists())
        .collect();

    let config = settings::create_vault(resolver.source(), &name, &root)?;

    let mut created = 0;
    for ((dir, purpose), was_missing) in paths.required_folders().into_iter().zip(missing) {
        if was_missing {
            created += 1;
            println!("{} Created {} ({})", "✓".green(), dir.display(), purpose);
        } else {
            println!("{} {} exists ({})", "✓".green(), dir.display(), purpose);
        }
    }

    println!();
    println!("{}", "Summary".bold());
    println!("{}", "=".repeat(50));
    println!("Vault:   {}", config.vault_name.cyan());
    println!("Path:    {}", root.display());
    println!("Created: {} folders", created.to_string().green());
    println!();
    println!("{}", "✓ Vault is ready!".green());
    Ok(())
}
