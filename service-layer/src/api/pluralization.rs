//! Resource name pluralization for Service Layer entity types
//!
//! Resources are the English plural of the PascalCase entity type name
//! (`Item` → `Items`, `BusinessPartner` → `BusinessPartners`,
//! `JournalEntry` → `JournalEntries`). Only the trailing word is inflected.

/// Type names whose resource does not follow the regular rules
const IRREGULAR: &[(&str, &str)] = &[
    ("SalesPerson", "SalesPersons"),
    ("ChartOfAccount", "ChartOfAccounts"),
    ("UserLanguage", "UserLanguages"),
];

/// Convert an entity type name to its resource name
pub fn pluralize_entity_name(entity_name: &str) -> String {
    overrideable_pluralize_entity_name(entity_name, false)
}

/// Convert an entity type name to its resource name, optionally skipping the
/// English grammar rules.
///
/// When `force_simple` is true only `s`/`es` are appended, which matches how
/// user-defined tables (`U_*`) are usually exposed.
pub fn overrideable_pluralize_entity_name(entity_name: &str, force_simple: bool) -> String {
    if entity_name.is_empty() {
        return entity_name.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == entity_name) {
        return plural.to_string();
    }

    let lower = entity_name.to_lowercase();

    // Sibilant endings take 'es' even in simple mode
    if ["s", "sh", "ch", "x"].iter().any(|end| lower.ends_with(end)) {
        return format!("{}es", entity_name);
    }

    if force_simple {
        return format!("{}s", entity_name);
    }

    if lower.ends_with('z') && !lower.ends_with("tz") {
        return format!("{}zes", entity_name);
    }

    // Consonant + 'y' -> 'ies'
    if let Some(stem) = entity_name.strip_suffix(['y', 'Y']) {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if matches!(before, Some(c) if !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }

    format!("{}s", entity_name)
}
