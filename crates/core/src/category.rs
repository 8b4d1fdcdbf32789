//! Category constants and validation helpers.

use std::sync::LazyLock;

use regex::Regex;

/// Color assigned to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#007bff";

/// Maximum category name length in characters.
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// Check that `color` is a `#RRGGBB` hex string.
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR.is_match(color)
}

/// Validate a category name: non-blank and within the length limit.
pub fn validate_category_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err("Category name must not be empty".to_string());
    }
    if len > MAX_CATEGORY_NAME_LEN {
        return Err(format!(
            "Category name must be at most {MAX_CATEGORY_NAME_LEN} characters"
        ));
    }
    Ok(())
}
