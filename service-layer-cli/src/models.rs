//! Sample entities queried by the CLI

use serde::{Deserialize, Serialize};
use service_layer::Entity;

/// Fields the generic query handler filters on
pub trait Searchable: Entity {
    /// Key field used by `get` and `--code-prefix`
    const CODE_FIELD: &'static str;
    /// Description field used by `--name-contains`
    const NAME_FIELD: &'static str;
    const CREATED_FIELD: &'static str = "CreateDate";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Entity)]
#[serde(rename_all = "PascalCase", default)]
pub struct Item {
    #[entity(key)]
    pub item_code: String,
    pub item_name: Option<String>,
    pub item_type: Option<String>,
    pub bar_code: Option<String>,
    pub on_hand: Option<f64>,
    pub create_date: Option<String>,
}

impl Searchable for Item {
    const CODE_FIELD: &'static str = "ItemCode";
    const NAME_FIELD: &'static str = "ItemName";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Entity)]
#[serde(rename_all = "PascalCase", default)]
pub struct BusinessPartner {
    #[entity(key)]
    pub card_code: String,
    pub card_name: Option<String>,
    pub card_type: Option<String>,
    pub phone1: Option<String>,
    #[serde(rename = "EmailAddress")]
    pub email: Option<String>,
    pub current_account_balance: Option<f64>,
    pub create_date: Option<String>,
}

impl Searchable for BusinessPartner {
    const CODE_FIELD: &'static str = "CardCode";
    const NAME_FIELD: &'static str = "CardName";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        assert_eq!(Item::resource_name(), "Items");
        assert_eq!(BusinessPartner::resource_name(), "BusinessPartners");
    }

    #[test]
    fn test_wire_names() {
        let names = BusinessPartner::schema().property_names();
        assert_eq!(names[0], "CardCode");
        assert!(names.contains(&"EmailAddress".to_string()));
        assert!(names.contains(&"Phone1".to_string()));
    }
}
