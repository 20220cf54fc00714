use slug::slugify;
use thiserror::Error;

use crate::models::{
    profile::Category,
    task::{PERSONAL_CATEGORY, WORK_CATEGORY},
};

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Category '{0}' already exists")]
    AlreadyExists(String),

    #[error("Category '{0}' not found")]
    NotFound(String),
}

pub struct CreateCategoryParameters {
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// Appends a category whose id is the slug of its name
pub fn create_category(
    categories: &mut Vec<Category>,
    parameters: CreateCategoryParameters,
) -> Result<Category, CategoryError> {
    let name = parameters.name.trim();
    let id = slugify(name);
    if id.is_empty() {
        return Err(CategoryError::EmptyName);
    }

    let reserved = id == WORK_CATEGORY || id == PERSONAL_CATEGORY;
    if reserved || categories.iter().any(|c| c.id == id) {
        return Err(CategoryError::AlreadyExists(id));
    }

    let category = Category {
        id,
        name: name.to_string(),
        color: parameters.color,
        icon: parameters.icon,
    };
    categories.push(category.clone());
    Ok(category)
}

pub fn remove_category(categories: &mut Vec<Category>, id: &str) -> Result<Category, CategoryError> {
    let position = categories
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| CategoryError::NotFound(id.to_string()))?;
    Ok(categories.remove(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(name: &str) -> CreateCategoryParameters {
        CreateCategoryParameters {
            name: name.to_string(),
            color: "#10b981".to_string(),
            icon: "leaf".to_string(),
        }
    }

    #[test]
    fn ids_are_slugs_and_unique() {
        let mut categories = vec![];
        let created = create_category(&mut categories, params("Side Projects")).unwrap();
        assert_eq!(created.id, "side-projects");

        match create_category(&mut categories, params("side projects")) {
            Err(CategoryError::AlreadyExists(id)) => assert_eq!(id, "side-projects"),
            _ => panic!("Expected AlreadyExists error"),
        }
        assert_eq!(categories.len(), 1);
    }

    #[test]
    fn built_in_ids_are_reserved() {
        let mut categories = vec![];
        assert!(matches!(
            create_category(&mut categories, params("Work")),
            Err(CategoryError::AlreadyExists(_))
        ));
        assert!(matches!(
            create_category(&mut categories, params("   ")),
            Err(CategoryError::EmptyName)
        ));
    }

    #[test]
    fn remove_missing_category() {
        let mut categories = vec![];
        assert!(matches!(
            remove_category(&mut categories, "nope"),
            Err(CategoryError::NotFound(_))
        ));
    }
}
