//! Property-name case conversion.

/// Convert an internal camelCase property name to its hyphenated CSS form.
///
/// - `backgroundColor` → `background-color`
/// - `borderTopWidth` → `border-top-width`
/// - `color`, `margin-top` → unchanged
/// - `WebkitTransition` → `-webkit-transition` (leading capital is a vendor prefix)
/// - `--accentColor` → unchanged (custom properties are case-sensitive)
pub fn to_kebab_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 4);
    let mut after_lower = false;
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i == 0 || after_lower {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            after_lower = false;
        } else {
            out.push(c);
            after_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
