//! Typed access to one Service Layer resource
//!
//! A [`ResourceSet`] pairs an entity type with a resource name and an
//! immutable [`Query`]. Refinement methods return a new set and leave the
//! receiver untouched, so a set can serve as the base of several independent
//! queries:
//!
//! ```ignore
//! let items = context.set::<Item>();
//! let kits = items.filter(field("ItemCode").starts_with("KIT"));
//! let bolts = items.filter(field("ItemName").contains("bolt"));
//! ```
//!
//! Terminal operations build the request URI, run it through the session
//! manager and decode the response.

use log::debug;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::client::SessionManager;
use super::json;
use super::metadata::{Entity, key_predicate};
use super::query::{Filter, OrderBy, Projection, Query, QueryBuilder, QueryResponse};
use super::transport::HttpRequest;
use crate::error::Result;

pub struct ResourceSet<T> {
    manager: Arc<SessionManager>,
    resource: Arc<str>,
    query: Query,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceSet<T> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            resource: Arc::clone(&self.resource),
            query: self.query.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for ResourceSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSet")
            .field("resource", &self.resource)
            .field("query", &self.query)
            .finish()
    }
}

impl<T: Entity> ResourceSet<T> {
    pub(crate) fn new(manager: Arc<SessionManager>, resource: impl Into<Arc<str>>) -> Self {
        Self {
            manager,
            resource: resource.into(),
            query: Query::new(),
            _entity: PhantomData,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    fn refine(&self, query: Query) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            resource: Arc::clone(&self.resource),
            query,
            _entity: PhantomData,
        }
    }

    /// Start a new query base with `predicate`.
    ///
    /// Projection, ordering and paging set on the receiver are dropped.
    pub fn filter(&self, predicate: Filter) -> Self {
        self.refine(self.query.with_filter(predicate))
    }

    pub fn select(&self, projection: Projection) -> Self {
        self.refine(self.query.with_select(projection))
    }

    /// Ascending order by one field or a tuple of fields
    pub fn order_by(&self, order: impl Into<OrderBy>) -> Self {
        self.refine(self.query.with_order_by(order.into()))
    }

    pub fn top(&self, top: u32) -> Self {
        self.refine(self.query.with_top(top))
    }

    pub fn skip(&self, skip: u32) -> Self {
        self.refine(self.query.with_skip(skip))
    }

    /// Replace the whole query with one composed elsewhere
    pub fn with_query(&self, query: Query) -> Self {
        self.refine(query)
    }

    /// URI a list call on this set would request
    pub fn to_uri(&self) -> Result<String> {
        QueryBuilder::new(T::schema()).build_uri(&self.resource, &self.query)
    }

    pub async fn to_list(&self, cancel: &CancellationToken) -> Result<Vec<T>> {
        self.to_list_as(cancel).await
    }

    /// Run the query and decode rows into another entity shape, typically
    /// the result type of a projection. Response keys are matched against
    /// `U`'s wire names.
    pub async fn to_list_as<U: Entity>(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<U>> {
        let uri = self.to_uri()?;
        self.fetch(uri, cancel).await.map(QueryResponse::into_vec)
    }

    /// First matching row, `None` when nothing matches
    pub async fn first(&self, cancel: &CancellationToken) -> Result<Option<T>> {
        let uri = self.to_uri()?;
        let separator = if uri.contains('?') { '&' } else { '?' };
        let uri = format!("{}{}$top=1", uri, separator);
        self.fetch(uri, cancel).await.map(QueryResponse::into_first)
    }

    /// Number of rows matching the current predicate
    pub async fn count(&self, cancel: &CancellationToken) -> Result<u64> {
        let uri = QueryBuilder::new(T::schema()).build_count_uri(&self.resource, &self.query)?;
        let response = self.manager.execute(HttpRequest::get(uri), cancel).await?;
        json::decode_count(&response.body)
    }

    pub async fn any(&self, cancel: &CancellationToken) -> Result<bool> {
        Ok(self.count(cancel).await? > 0)
    }

    /// Create `entity` on the server and replace it with the server's
    /// representation, which may carry defaults the server assigned
    pub async fn add(&self, entity: &mut T, cancel: &CancellationToken) -> Result<()> {
        let body = serde_json::to_value(&*entity)?;
        let request = HttpRequest::post(self.resource.to_string()).with_json(body);
        let response = self.manager.execute(request, cancel).await?;

        if response.body.trim().is_empty() {
            debug!("{} add returned no body, keeping local value", self.resource);
            return Ok(());
        }
        *entity = json::decode(&response.body, &T::schema().wire_names())?;
        Ok(())
    }

    /// Patch the entity addressed by its key with its current values
    pub async fn update(&self, entity: &T, cancel: &CancellationToken) -> Result<()> {
        let path = self.entity_path(entity)?;
        let body = serde_json::to_value(entity)?;
        self.manager
            .execute(HttpRequest::patch(path).with_json(body), cancel)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, entity: &T, cancel: &CancellationToken) -> Result<()> {
        let path = self.entity_path(entity)?;
        self.manager.execute(HttpRequest::delete(path), cancel).await?;
        Ok(())
    }

    /// Invoke a bound action such as `Close` or `Cancel` on the entity
    pub async fn execute_action(
        &self,
        entity: &T,
        action: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let path = format!("{}/{}", self.entity_path(entity)?, action);
        self.manager.execute(HttpRequest::post(path), cancel).await?;
        Ok(())
    }

    fn entity_path(&self, entity: &T) -> Result<String> {
        Ok(format!("{}{}", self.resource, key_predicate(entity)?))
    }

    async fn fetch<U: Entity>(
        &self,
        uri: String,
        cancel: &CancellationToken,
    ) -> Result<QueryResponse<U>> {
        let response = self.manager.execute(HttpRequest::get(uri), cancel).await?;
        let rows = json::decode_envelope(&response.body, &U::schema().wire_names())?;
        Ok(QueryResponse::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entity;
    use crate::api::query::field;
    use crate::api::testing::{MockTransport, options};
    use crate::api::transport::HttpResponse;
    use crate::error::Error;
    use reqwest::Method;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Entity)]
    #[serde(rename_all = "PascalCase", default)]
    struct Item {
        #[entity(key)]
        item_code: String,
        item_name: Option<String>,
        #[serde(rename = "U_Color")]
        color: Option<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Entity)]
    #[entity(resource = "Lines")]
    #[serde(rename_all = "PascalCase", default)]
    struct Line {
        #[entity(key)]
        a: Option<String>,
        #[entity(key)]
        b: i32,
        quantity: f64,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize, Entity)]
    #[serde(rename_all = "PascalCase", default)]
    struct Note {
        text: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Entity)]
    #[entity(resource = "Items")]
    #[serde(rename_all = "camelCase", default)]
    struct CamelItem {
        #[entity(key)]
        item_code: String,
        item_name: Option<String>,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize, Entity)]
    #[entity(resource = "Orders")]
    #[serde(rename_all = "PascalCase", default)]
    struct Order {
        #[entity(key)]
        doc_entry: u64,
        doc_total: f64,
    }

    fn set<T: Entity>(transport: &Arc<MockTransport>) -> ResourceSet<T> {
        let manager = SessionManager::with_transport(options(), transport.clone()).unwrap();
        ResourceSet::new(Arc::new(manager), T::resource_name())
    }

    fn rows(value: serde_json::Value) -> std::result::Result<HttpResponse, crate::error::BoxError> {
        Ok(HttpResponse::new(200, value.to_string()))
    }

    #[test]
    fn test_derived_schema() {
        let schema = Item::schema();
        assert_eq!(schema.name, "Item");
        assert_eq!(Item::resource_name(), "Items");
        assert_eq!(schema.property_names(), vec!["ItemCode", "ItemName", "U_Color"]);
        assert_eq!(schema.keys().map(|p| p.field).collect::<Vec<_>>(), vec!["item_code"]);
        assert_eq!(Line::resource_name(), "Lines");
    }

    #[test]
    fn test_refinements_are_independent() {
        let transport = MockTransport::with_login(|_| rows(json!({"value": []})));
        let items = set::<Item>(&transport);

        let kits = items.filter(field("ItemCode").starts_with("KIT"));
        let bolts = items.filter(field("ItemName").contains("bolt"));

        assert_eq!(items.to_uri().unwrap(), "Items?$select=ItemCode,ItemName,U_Color");
        assert!(kits.to_uri().unwrap().contains("$filter=startswith(ItemCode,'KIT')"));
        assert!(!kits.to_uri().unwrap().contains("bolt"));
        assert!(bolts.to_uri().unwrap().contains("$filter=contains(ItemName,'bolt')"));
        assert!(!bolts.to_uri().unwrap().contains("KIT"));
    }

    #[tokio::test]
    async fn test_to_list_issues_composed_query() {
        let transport = MockTransport::with_login(|_| {
            rows(json!({"value": [
                {"ItemCode": "PRUEBA1", "ItemName": "Test one"},
                {"itemcode": "PRUEBA2", "ITEMNAME": "Test two", "u_color": "red"},
            ]}))
        });
        let items = set::<Item>(&transport);

        let found = items
            .filter(field("code").starts_with("PRUEBA"))
            .order_by(["code", "name"])
            .skip(7)
            .top(10)
            .to_list(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[1].item_code, "PRUEBA2");
        assert_eq!(found[1].color.as_deref(), Some("red"));

        let uri = &transport.paths()[1];
        assert!(uri.contains("$filter=startswith(Code,'PRUEBA')"));
        assert!(uri.contains("$orderby=Code asc,Name asc"));
        assert!(uri.contains("$skip=7"));
        assert!(uri.contains("$top=10"));
    }

    #[tokio::test]
    async fn test_first_appends_top_one() {
        let transport = MockTransport::with_login(|_| {
            rows(json!({"value": [{"ItemCode": "A1", "ItemName": "Anvil"}]}))
        });
        let items = set::<Item>(&transport);

        let first = items
            .filter(field("ItemCode").eq("A1"))
            .first(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(first.unwrap().item_name.as_deref(), Some("Anvil"));
        assert_eq!(
            transport.paths()[1],
            "Items?$filter=(ItemCode eq 'A1')&$select=ItemCode,ItemName,U_Color&$top=1"
        );
    }

    #[tokio::test]
    async fn test_first_on_empty_result_is_none() {
        let transport = MockTransport::with_login(|_| rows(json!({"value": []})));
        let items = set::<Item>(&transport);
        let first = items.first(&CancellationToken::new()).await.unwrap();
        assert!(first.is_none());
    }

    #[tokio::test]
    async fn test_count_and_any() {
        let transport = MockTransport::with_login(|request| {
            if request.path.contains("Missing") {
                Ok(HttpResponse::new(200, "0"))
            } else {
                Ok(HttpResponse::new(200, "12"))
            }
        });
        let items = set::<Item>(&transport);
        let cancel = CancellationToken::new();

        assert_eq!(items.count(&cancel).await.unwrap(), 12);
        assert!(items.any(&cancel).await.unwrap());
        let missing = items.filter(field("ItemName").eq("Missing"));
        assert!(!missing.any(&cancel).await.unwrap());

        let paths = transport.paths();
        assert_eq!(paths[1], "Items/$count");
        assert_eq!(paths[3], "Items/$count?$filter=(ItemName eq 'Missing')");
        assert_eq!(transport.login_count(), 1);
    }

    #[tokio::test]
    async fn test_add_replaces_local_value() {
        let transport = MockTransport::with_login(|request| {
            assert_eq!(request.method, Method::POST);
            assert_eq!(request.body.as_ref().unwrap()["ItemCode"], json!("N1"));
            rows(json!({"ItemCode": "N1", "ItemName": "New", "U_Color": "blue"}))
        });
        let items = set::<Item>(&transport);

        let mut item = Item {
            item_code: "N1".to_string(),
            item_name: Some("New".to_string()),
            color: None,
        };
        items.add(&mut item, &CancellationToken::new()).await.unwrap();

        assert_eq!(item.color.as_deref(), Some("blue"));
        assert_eq!(transport.paths()[1], "Items");
    }

    #[tokio::test]
    async fn test_add_without_body_keeps_value() {
        let transport = MockTransport::with_login(|_| Ok(HttpResponse::new(204, "")));
        let items = set::<Item>(&transport);
        let mut item = Item {
            item_code: "N2".to_string(),
            ..Item::default()
        };
        items.add(&mut item, &CancellationToken::new()).await.unwrap();
        assert_eq!(item.item_code, "N2");
    }

    #[tokio::test]
    async fn test_update_composite_key() {
        let transport = MockTransport::with_login(|_| Ok(HttpResponse::new(204, "")));
        let lines = set::<Line>(&transport);
        let line = Line {
            a: Some("1".to_string()),
            b: 2,
            quantity: 5.0,
        };

        lines.update(&line, &CancellationToken::new()).await.unwrap();

        let request = &transport.requests()[1];
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path, "Lines(A='1',B=2)");
        assert_eq!(request.body.as_ref().unwrap()["Quantity"], json!(5.0));
    }

    #[tokio::test]
    async fn test_delete_and_action() {
        let transport = MockTransport::with_login(|_| Ok(HttpResponse::new(204, "")));
        let items = set::<Item>(&transport);
        let item = Item {
            item_code: "B-T203".to_string(),
            ..Item::default()
        };
        let cancel = CancellationToken::new();

        items.delete(&item, &cancel).await.unwrap();
        items.execute_action(&item, "Cancel", &cancel).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[1].method, Method::DELETE);
        assert_eq!(requests[1].path, "Items(ItemCode='B-T203')");
        assert_eq!(requests[2].method, Method::POST);
        assert_eq!(requests[2].path, "Items(ItemCode='B-T203')/Cancel");
        assert!(requests[2].body.is_none());
    }

    #[tokio::test]
    async fn test_null_key_fails_before_network() {
        let transport = MockTransport::with_login(|_| Ok(HttpResponse::new(204, "")));
        let lines = set::<Line>(&transport);
        let line = Line {
            a: None,
            b: 2,
            quantity: 1.0,
        };
        let cancel = CancellationToken::new();

        assert!(matches!(lines.update(&line, &cancel).await, Err(Error::Value(_))));
        assert!(matches!(lines.delete(&line, &cancel).await, Err(Error::Value(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_keyless_entity_is_schema_error() {
        let transport = MockTransport::with_login(|_| Ok(HttpResponse::new(204, "")));
        let notes = set::<Note>(&transport);
        let note = Note {
            text: "hello".to_string(),
        };
        let err = notes.delete(&note, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_translation_error_fails_before_network() {
        let transport = MockTransport::with_login(|_| rows(json!({"value": []})));
        let items = set::<Item>(&transport);
        let bad = items.filter(Filter::call("length", field("ItemName"), vec![]));

        let err = bad.to_list(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::QueryTranslation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_projected_rows() {
        #[derive(Debug, Serialize, Deserialize, Entity)]
        #[serde(rename_all = "PascalCase")]
        struct CodeOnly {
            item_code: String,
        }

        let transport =
            MockTransport::with_login(|_| rows(json!({"value": [{"itemCode": "Z9"}]})));
        let items = set::<Item>(&transport);

        let codes: Vec<CodeOnly> = items
            .select(Projection::member("itemCode"))
            .to_list_as(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(codes[0].item_code, "Z9");
        assert_eq!(transport.paths()[1], "Items?$select=ItemCode");
    }

    #[tokio::test]
    async fn test_camel_case_entity_decodes_pascal_case_keys() {
        let transport = MockTransport::with_login(|request| {
            if request.method == Method::POST {
                rows(json!({"ItemCode": "N1", "ItemName": "Created"}))
            } else {
                rows(json!({"value": [{"ItemCode": "A1", "ItemName": "Anvil"}]}))
            }
        });
        let items = set::<CamelItem>(&transport);
        let cancel = CancellationToken::new();

        let found = items.to_list(&cancel).await.unwrap();
        assert_eq!(
            found,
            vec![CamelItem {
                item_code: "A1".to_string(),
                item_name: Some("Anvil".to_string()),
            }]
        );
        assert_eq!(transport.paths()[1], "Items?$select=ItemCode,ItemName");

        let mut item = CamelItem {
            item_code: "N1".to_string(),
            item_name: None,
        };
        items.add(&mut item, &cancel).await.unwrap();
        assert_eq!(item.item_name.as_deref(), Some("Created"));
        assert_eq!(transport.requests()[2].body.as_ref().unwrap()["itemCode"], json!("N1"));
    }

    #[tokio::test]
    async fn test_reserved_characters_in_filter_and_key() {
        let transport = MockTransport::with_login(|_| rows(json!({"value": []})));
        let items = set::<Item>(&transport);
        let cancel = CancellationToken::new();

        items
            .filter(field("ItemName").eq("Nuts & Bolts #5 50%"))
            .to_list(&cancel)
            .await
            .unwrap();
        let item = Item {
            item_code: "A/B&C".to_string(),
            ..Item::default()
        };
        items.delete(&item, &cancel).await.unwrap();

        let paths = transport.paths();
        assert_eq!(
            paths[1],
            "Items?$filter=(ItemName eq 'Nuts%20%26%20Bolts%20%235%2050%25')&$select=ItemCode,ItemName,U_Color"
        );
        assert_eq!(paths[2], "Items(ItemCode='A%2FB%26C')");
    }

    #[tokio::test]
    async fn test_unsigned_key() {
        let transport = MockTransport::with_login(|_| Ok(HttpResponse::new(204, "")));
        let orders = set::<Order>(&transport);
        let order = Order {
            doc_entry: u64::MAX,
            doc_total: 0.0,
        };

        orders.delete(&order, &CancellationToken::new()).await.unwrap();
        assert_eq!(transport.paths()[1], "Orders(DocEntry=18446744073709551615)");
    }
}
