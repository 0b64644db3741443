//! Integration tests for the admin dashboard.

use reqwest::StatusCode;

use greengrocer_integration_tests::TestContext;

// ============================================================================
// Access Control
// ============================================================================

#[tokio::test]
async fn guests_are_sent_to_login() {
    let ctx = TestContext::start().await;

    let resp = ctx.get("/admin").await;

    assert_eq!(resp.url().path(), "/login");
}

#[tokio::test]
async fn shoppers_are_sent_home() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;

    let resp = ctx.get("/admin").await;

    assert_eq!(resp.url().path(), "/");
}

#[tokio::test]
async fn admins_see_the_dashboard() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let resp = ctx.get("/admin").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("read dashboard");

    assert!(body.contains("Admin Dashboard"));
    // The products tab opens first, with each row naming its department.
    assert!(body.contains("Braeburn Apples"));
    assert!(body.contains("Dairy"));
    assert!(body.contains("href=\"/admin\""));
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn creating_a_product_updates_the_panel() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let dept = ctx
        .grocer
        .department_id("Bakery")
        .expect("seeded department")
        .to_string();
    let resp = ctx
        .hx_post(
            "/admin/products",
            &[
                ("name", "Rye Crackers"),
                ("price", "3.25"),
                ("department_id", &dept),
                ("image_url", ""),
            ],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("read admin panel");

    assert!(body.contains("Rye Crackers"));
    assert!(body.contains("$3.25"));
    // Success closes the modal through an out-of-band swap.
    assert!(body.contains("hx-swap-oob"));

    assert!(ctx.grocer.product_id("Rye Crackers").is_some());
}

#[tokio::test]
async fn a_bad_price_re_renders_the_form_in_the_modal() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let dept = ctx
        .grocer
        .department_id("Bakery")
        .expect("seeded department")
        .to_string();
    let resp = ctx
        .hx_post(
            "/admin/products",
            &[
                ("name", "Rye Crackers"),
                ("price", "three fifty"),
                ("department_id", &dept),
                ("image_url", ""),
            ],
        )
        .await;

    assert_eq!(
        resp.headers().get("hx-retarget").and_then(|v| v.to_str().ok()),
        Some("#admin-modal")
    );
    let body = resp.text().await.expect("read form");

    assert!(body.contains("Enter a valid price"));
    // The rejected entry round-trips so nothing typed is lost.
    assert!(body.contains("three fifty"));

    assert!(ctx.grocer.product_id("Rye Crackers").is_none());
}

#[tokio::test]
async fn a_blank_name_is_rejected() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let dept = ctx
        .grocer
        .department_id("Bakery")
        .expect("seeded department")
        .to_string();
    let resp = ctx
        .hx_post(
            "/admin/products",
            &[
                ("name", "   "),
                ("price", "3.25"),
                ("department_id", &dept),
                ("image_url", ""),
            ],
        )
        .await;

    let body = resp.text().await.expect("read form");
    assert!(body.contains("Name is required"));
}

#[tokio::test]
async fn the_edit_form_is_prefilled() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let cheddar = ctx.grocer.product_id("Mature Cheddar").expect("seeded product");
    let resp = ctx.hx_get(&format!("/admin/products/{cheddar}/edit")).await;
    let body = resp.text().await.expect("read form");

    assert!(body.contains("Edit Product"));
    assert!(body.contains("Mature Cheddar"));
    assert!(body.contains("4.75"));
}

#[tokio::test]
async fn editing_a_product_renames_and_moves_it() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    // Rename Whole Milk and move it from Dairy into Bakery.
    let milk = ctx.grocer.product_id("Whole Milk").expect("seeded product");
    let bakery = ctx
        .grocer
        .department_id("Bakery")
        .expect("seeded department")
        .to_string();
    let resp = ctx
        .hx_put(
            &format!("/admin/products/{milk}"),
            &[
                ("name", "Oat Milk"),
                ("price", "2.75"),
                ("department_id", &bakery),
                ("image_url", ""),
            ],
        )
        .await;

    let body = resp.text().await.expect("read admin panel");
    assert!(body.contains("Oat Milk"));
    assert!(!body.contains("Whole Milk"));

    // The storefront catalog sees the change on its next render, with the
    // product now filed under its new department.
    let bakery_section = ctx
        .get_text(&format!("/catalog?department_id={bakery}"))
        .await;
    assert!(bakery_section.contains("Oat Milk"));
    assert!(bakery_section.contains("Sourdough Loaf"));
}

#[tokio::test]
async fn deleting_a_product_removes_its_row() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let bananas = ctx.grocer.product_id("Bananas").expect("seeded product");
    let resp = ctx.hx_delete(&format!("/admin/products/{bananas}")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("read admin panel");
    assert!(!body.contains("Bananas"));
    assert!(ctx.grocer.product_id("Bananas").is_none());
}

// ============================================================================
// Departments
// ============================================================================

#[tokio::test]
async fn creating_a_department_adds_a_row() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let resp = ctx
        .hx_post("/admin/departments", &[("name", "Frozen Foods")])
        .await;

    let body = resp.text().await.expect("read departments panel");
    assert!(body.contains("Frozen Foods"));
    assert!(ctx.grocer.department_id("Frozen Foods").is_some());
}

#[tokio::test]
async fn blank_department_names_are_rejected() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let resp = ctx.hx_post("/admin/departments", &[("name", "   ")]).await;

    assert_eq!(
        resp.headers().get("hx-retarget").and_then(|v| v.to_str().ok()),
        Some("#admin-modal")
    );
    let body = resp.text().await.expect("read form");
    assert!(body.contains("Name is required"));
}

#[tokio::test]
async fn renaming_a_department_relabels_product_rows() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let dairy = ctx.grocer.department_id("Dairy").expect("seeded department");
    let resp = ctx
        .hx_put(&format!("/admin/departments/{dairy}"), &[("name", "Dairy & Eggs")])
        .await;
    let body = resp.text().await.expect("read departments panel");
    assert!(body.contains("Dairy &amp; Eggs"));

    let products = ctx.hx_get("/admin/products").await;
    let body = products.text().await.expect("read products panel");
    assert!(body.contains("Dairy &amp; Eggs"));
}

#[tokio::test]
async fn departments_with_products_cannot_be_deleted() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;

    let dairy = ctx.grocer.department_id("Dairy").expect("seeded department");
    let resp = ctx.hx_delete(&format!("/admin/departments/{dairy}")).await;

    assert_eq!(
        resp.headers().get("hx-retarget").and_then(|v| v.to_str().ok()),
        Some("#toasts")
    );
    let body = resp.text().await.expect("read toast");
    assert!(body.contains("Cannot delete department with products"));
    assert!(ctx.grocer.department_id("Dairy").is_some());
}

#[tokio::test]
async fn empty_departments_delete_cleanly() {
    let ctx = TestContext::start().await;
    ctx.sign_in_admin().await;
    ctx.hx_post("/admin/departments", &[("name", "Seasonal")]).await;

    let seasonal = ctx.grocer.department_id("Seasonal").expect("created department");
    let resp = ctx.hx_delete(&format!("/admin/departments/{seasonal}")).await;

    let body = resp.text().await.expect("read departments panel");
    assert!(!body.contains("Seasonal"));
    assert!(ctx.grocer.department_id("Seasonal").is_none());
}
