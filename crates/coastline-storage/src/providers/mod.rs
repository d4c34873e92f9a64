//! Object storage provider implementations.

pub mod local;
pub mod supabase;

pub use local::LocalStorage;
pub use supabase::SupabaseStorage;

use coastline_core::{AppError, AppResult};

/// Reject object paths that are empty or escape their bucket.
pub(crate) fn check_object_path(path: &str) -> AppResult<()> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::validation("Object path must not be empty"));
    }
    if trimmed
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(AppError::validation(format!("Invalid object path: {path}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_check() {
        assert!(check_object_path("user/abc.png").is_ok());
        assert!(check_object_path("").is_err());
        assert!(check_object_path("../etc/passwd").is_err());
        assert!(check_object_path("a//b").is_err());
    }
}
