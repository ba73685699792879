/// Collapses any run of whitespace (spaces, tabs, newlines) into a single
/// space and trims the ends. Absent input yields the empty string.
pub fn normalize(text: Option<&str>) -> String {
    match text {
        None => String::new(),
        Some(raw) => raw.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Lower-cases a name and collapses every run of non-alphanumeric characters
/// into a single underscore, after trimming outer whitespace.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_gap = false;
    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_gap {
                slug.push('_');
                pending_gap = false;
            }
            slug.push(ch);
        } else {
            pending_gap = true;
        }
    }
    if pending_gap {
        slug.push('_');
    }
    slug
}
