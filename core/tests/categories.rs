use dash_core::categories::{Categories, CategoryRole};
use dash_core::model::ModelChange;
use dash_core::results::Role;
use dash_core::template::TemplateDefaults;
use dash_core::types::{CannedQuery, Category, CategoryId, ScopeResult};
use serde_json::Value;
use std::sync::Arc;

fn registry(max_categories: usize) -> Categories {
    Categories::new(Arc::new(TemplateDefaults::new()), max_categories)
}

fn category(id: &str) -> Arc<Category> {
    Arc::new(Category::new(CategoryId::try_from(id).unwrap(), id, "{}"))
}

fn ids(categories: &Categories) -> Vec<&str> {
    categories.category_ids().into_iter().map(|id| id.as_str()).collect()
}

/// Registers `id` for the current search and gives it one result.
fn deliver(categories: &mut Categories, id: &str, uri: &str) {
    let cat = category(id);
    let result = Arc::new(ScopeResult::new(Arc::clone(&cat), uri).with_field("label", uri));
    categories.register_category(cat, None).add_results(vec![result]);
    categories.update_result_count(id);
}

/// Verify categories keep the order in which they were first announced.
#[test]
fn test_categories_in_first_seen_order() {
    let mut categories = registry(32);

    deliver(&mut categories, "apps", "app://1");
    deliver(&mut categories, "music", "music://1");
    deliver(&mut categories, "videos", "video://1");

    assert_eq!(ids(&categories), vec!["apps", "music", "videos"]);
    assert_eq!(categories.lookup_category("music").unwrap().count(), 1);
    assert_eq!(
        categories.lookup_category("music").unwrap().category_id().map(|id| id.as_str()),
        Some("music")
    );
}

/// Verify a category reappearing after an emptied one is moved before it.
#[test]
fn test_reregistered_category_moves_before_first_empty() {
    let mut categories = registry(32);
    deliver(&mut categories, "apps", "app://1");
    deliver(&mut categories, "music", "music://1");
    categories.mark_new_search();
    categories.purge_results();
    categories.take_changes();

    categories.register_category(category("music"), None);

    assert_eq!(ids(&categories), vec!["music", "apps"]);
    assert_eq!(
        categories.take_changes(),
        vec![
            ModelChange::Removed { first: 1, last: 1 },
            ModelChange::Inserted { first: 0, last: 0 },
        ]
    );
}

/// Verify a new category takes the slot of the first empty one.
#[test]
fn test_new_category_inserted_at_first_empty() {
    let mut categories = registry(32);
    categories.register_category(category("apps"), None);

    deliver(&mut categories, "music", "music://1");

    assert_eq!(ids(&categories), vec!["music", "apps"]);
}

/// Verify alternating searches with a one-category ceiling settle on a single category.
#[test]
fn test_alternating_searches_keep_one_category() {
    let mut categories = registry(1);

    deliver(&mut categories, "empty-query", "a://1");
    categories.purge_results();
    assert_eq!(ids(&categories), vec!["empty-query"]);

    categories.mark_new_search();
    deliver(&mut categories, "foo", "b://1");
    categories.purge_results();
    assert_eq!(ids(&categories), vec!["foo"]);

    categories.mark_new_search();
    deliver(&mut categories, "empty-query", "a://1");
    categories.purge_results();
    assert_eq!(ids(&categories), vec!["empty-query"]);
    assert_eq!(categories.lookup_category("empty-query").unwrap().count(), 1);
}

/// Verify categories unused by the new search are emptied but kept below the ceiling.
#[test]
fn test_purge_clears_unused_results() {
    let mut categories = registry(32);
    deliver(&mut categories, "apps", "app://1");
    deliver(&mut categories, "music", "music://1");

    categories.mark_new_search();
    deliver(&mut categories, "music", "music://2");
    categories.purge_results();

    assert_eq!(categories.count(), 2);
    assert!(categories.lookup_category("apps").unwrap().is_empty());
    assert_eq!(categories.data(0, CategoryRole::Count), Some(Value::from(0)));
}

/// Verify only the oldest unused empty category is dropped per purge.
#[test]
fn test_purge_drops_oldest_unused_category() {
    let mut categories = registry(2);
    deliver(&mut categories, "a", "a://1");
    categories.mark_new_search();
    deliver(&mut categories, "b", "b://1");
    categories.mark_new_search();
    deliver(&mut categories, "c", "c://1");
    categories.mark_new_search();
    deliver(&mut categories, "d", "d://1");

    categories.purge_results();

    assert_eq!(ids(&categories), vec!["b", "c", "d"]);
    categories.purge_results();
    assert_eq!(ids(&categories), vec!["c", "d"]);
}

/// Verify special categories are prepended, counted externally, and survive purges.
#[test]
fn test_special_category_survives_purge() {
    let mut categories = registry(1);
    deliver(&mut categories, "apps", "app://1");
    categories.add_special_category(CategoryId::try_from("recent").unwrap(), "Recent", "", "{}", 4);

    categories.mark_new_search();
    categories.purge_results();
    categories.purge_results();

    assert_eq!(ids(&categories), vec!["recent", "apps"]);
    assert_eq!(categories.data(0, CategoryRole::Count), Some(Value::from(4)));
    assert!(categories.results_at(0).is_none());

    categories.take_changes();
    categories.set_special_count("recent", 7);
    assert_eq!(
        categories.take_changes(),
        vec![ModelChange::DataChanged {
            first: 0,
            last: 0,
            roles: vec!["count"]
        }]
    );
}

/// Verify a duplicate special category id is refused.
#[test]
fn test_special_category_collision_is_ignored() {
    let mut categories = registry(32);
    deliver(&mut categories, "apps", "app://1");

    categories.add_special_category(CategoryId::try_from("apps").unwrap(), "Apps", "", "{}", 0);

    assert_eq!(categories.count(), 1);
}

/// Verify re-announced categories report only the attributes that changed.
#[test]
fn test_attribute_change_emits_scoped_roles() {
    let mut categories = registry(32);
    deliver(&mut categories, "apps", "app://1");
    categories.take_changes();

    let renamed = Category::new(CategoryId::try_from("apps").unwrap(), "Applications", "{}")
        .with_query(CannedQuery::new("apps-scope").with_department("installed"));
    categories.register_category(Arc::new(renamed), None);

    assert_eq!(
        categories.take_changes(),
        vec![ModelChange::DataChanged {
            first: 0,
            last: 0,
            roles: vec!["name", "headerLink"]
        }]
    );
    assert_eq!(
        categories.data(0, CategoryRole::HeaderLink),
        Some(Value::from("scope://apps-scope?q=&dep=installed"))
    );
}

/// Verify the template's components section drives the results model roles.
#[test]
fn test_template_mapping_reaches_results_model() {
    let mut categories = registry(32);
    let cat = Arc::new(Category::new(
        CategoryId::try_from("apps").unwrap(),
        "Apps",
        r#"{"components": {"title": "name", "art": "icon"}}"#,
    ));
    let result = ScopeResult::new(Arc::clone(&cat), "app://calc")
        .with_field("name", "Calculator")
        .with_field("icon", "calc.png");

    categories.register_category(cat, None).add_results(vec![Arc::new(result)]);

    let model = categories.lookup_category("apps").unwrap();
    assert_eq!(model.data(0, Role::Title), Some(Value::from("Calculator")));
    assert_eq!(model.data(0, Role::Art), Some(Value::from("calc.png")));
    assert_eq!(model.data(0, Role::Subtitle), None);
}

/// Verify a runtime template override resets rows whose mapping changed.
#[test]
fn test_override_category_json() {
    let mut categories = registry(32);
    deliver(&mut categories, "apps", "app://1");
    categories.lookup_category_mut("apps").unwrap().take_changes();

    assert!(categories.override_category_json("apps", r#"{"components": {"title": "label"}}"#));
    assert!(!categories.override_category_json("apps", "not json"));
    assert!(!categories.override_category_json("missing", "{}"));

    let model = categories.lookup_category_mut("apps").unwrap();
    assert_eq!(model.take_changes(), vec![ModelChange::Reset]);
    assert_eq!(model.data(0, Role::Title), Some(Value::from("app://1")));
}

/// Verify malformed category json falls back to the default template.
#[test]
fn test_malformed_template_uses_defaults() {
    let mut categories = registry(32);
    let cat = Arc::new(Category::new(CategoryId::try_from("apps").unwrap(), "Apps", "{oops"));

    categories.register_category(cat, None);

    let renderer = categories.data(0, CategoryRole::Renderer).unwrap();
    assert_eq!(renderer["category-layout"], Value::from("grid"));
    assert_eq!(
        categories.data(0, CategoryRole::RawRendererTemplate),
        Some(Value::from("{oops"))
    );
}

/// Verify clearing empties every results model but keeps the categories.
#[test]
fn test_clear_all() {
    let mut categories = registry(32);
    deliver(&mut categories, "apps", "app://1");
    deliver(&mut categories, "music", "music://1");

    categories.clear_all();

    assert_eq!(categories.count(), 2);
    assert!(categories.lookup_category("apps").unwrap().is_empty());
    assert!(categories.lookup_category("music").unwrap().is_empty());
}
