pub mod drivers;
pub mod menus;
pub mod merchants;
pub mod users;

/// Required text field: present and not blank.
pub(crate) fn require_text(value: &str, message: &'static str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err(message);
    }
    Ok(())
}

/// Optional text field in a patch: absent is fine, supplied-but-blank is not.
pub(crate) fn reject_blank(value: Option<&str>, message: &'static str) -> Result<(), &'static str> {
    match value {
        Some(v) if v.trim().is_empty() => Err(message),
        _ => Ok(()),
    }
}
