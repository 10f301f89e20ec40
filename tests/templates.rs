use serde_json::json;
use tera::{Context, Tera};

fn render_index(page: usize, search: Option<&str>, status: Option<&str>) -> String {
    let tera = Tera::new("templates/**/*").expect("templates should parse");
    let mut context = Context::new();
    context.insert("alerts", &Vec::<String>::new());
    context.insert(
        "promo_codes",
        &json!({ "items": [], "pages": [1, 2, 3, null, 9], "page": page }),
    );
    context.insert("search", &search);
    context.insert("status", &status);
    context.insert("statuses", &["active", "inactive", "expired", "fully_used"]);
    context.insert("search_action", "/promo-codes");
    tera.render("promo_codes/index.html", &context)
        .expect("index should render")
}

#[test]
fn test_index_links_every_page_and_keeps_filters() {
    let html = render_index(2, Some("50%"), Some("fully_used"));

    assert!(html.contains("?page=1&search=50%25&status=fully_used"));
    assert!(html.contains("?page=3&search=50%25&status=fully_used"));
    assert!(html.contains("?page=9&search=50%25&status=fully_used"));
    assert!(html.contains(r#"<span class="current">2</span>"#));
    assert!(!html.contains("?page=2&"));
    assert!(html.contains("&hellip;"));
}

#[test]
fn test_index_links_without_filters() {
    let html = render_index(1, None, None);

    assert!(html.contains(r#"?page=2">2</a>"#));
    assert!(!html.contains("&search="));
    assert!(!html.contains("&status="));
}
