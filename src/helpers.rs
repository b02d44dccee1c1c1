/// One-based page number for an offset. A zero limit (empty search result)
/// reads as page 1.
pub fn calculate_current_page(offset: u32, limit: u32) -> u32 {
    if limit == 0 {
        return 1;
    }
    offset / limit + 1
}

/// Number of pages needed to show `total` items, rounding up.
pub fn calculate_total_pages(total: u32, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

pub fn ensure_min(value: i64, min: i64) -> i64 {
    value.max(min)
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_pokemon_name(name: &str) -> String {
    capitalize_first(name)
}

/// Height arrives in decimetres.
pub fn format_height(height: Option<u32>) -> String {
    match height {
        Some(h) if h > 0 => format!("{:.1}m", f64::from(h) / 10.0),
        _ => "Unknown".to_string(),
    }
}

/// Weight arrives in hectograms.
pub fn format_weight(weight: Option<u32>) -> String {
    match weight {
        Some(w) if w > 0 => format!("{:.1}kg", f64::from(w) / 10.0),
        _ => "Unknown".to_string(),
    }
}

pub fn format_types(types: &[String]) -> String {
    format_name_list(types)
}

pub fn format_abilities(abilities: &[String]) -> String {
    format_name_list(abilities)
}

fn format_name_list(names: &[String]) -> String {
    if names.is_empty() {
        return "Unknown".to_string();
    }
    names
        .iter()
        .map(|n| capitalize_first(n))
        .collect::<Vec<_>>()
        .join(", ")
}
