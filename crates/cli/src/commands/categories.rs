//! Category commands.
//!
//! # Usage
//!
//! ```bash
//! tally categories list
//! tally categories create --name Drinks
//! tally categories update 3 --name "Hot drinks"
//! ```

use tally_core::{CategoryDraft, CategoryId};

use super::CliError;

pub async fn list() -> Result<(), CliError> {
    let (_, client) = super::client()?;
    let categories = client.list_categories().await?;

    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }

    println!("{:>6}  NAME", "ID");
    for category in &categories {
        println!("{:>6}  {}", category.id, category.name);
    }
    Ok(())
}

/// Create (`existing: None`) or rename a category.
pub async fn save(name: &str, existing: Option<CategoryId>) -> Result<(), CliError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidInput(
            "category name must not be empty".to_string(),
        ));
    }

    let draft = CategoryDraft {
        name: name.to_string(),
    };

    let (_, client) = super::client()?;
    let saved = match existing {
        Some(id) => client.update_category(id, &draft).await?,
        None => client.create_category(&draft).await?,
    };

    println!("Saved category {}: {}", saved.id, saved.name);
    Ok(())
}
