use axum::{
    body::Body,
    extract::{FromRequest, Multipart, State},
    http::{Request, StatusCode},
};
use uuid::Uuid;

use better_view_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    error::AppError,
    middleware::auth::AuthUser,
    routes::products::create_product,
    state::AppState,
};

const BOUNDARY: &str = "test-boundary-7d21";

fn form_body(fields: &[(&str, &str)]) -> Body {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Body::from(body)
}

async fn multipart(fields: &[(&str, &str)]) -> anyhow::Result<Multipart> {
    let request = Request::builder()
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(form_body(fields))?;
    Multipart::from_request(request, &())
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))
}

fn test_user() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: "tester@example.com".to_string(),
    }
}

#[tokio::test]
async fn multipart_create_without_image() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&database_url).await?;
    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir: "uploads".to_string(),
    };
    let state = AppState { pool, orm, config };

    let name = format!("Iced Latte {}", Uuid::new_v4());
    let form = multipart(&[("name", name.as_str()), ("price", "6500")]).await?;

    let (status, response) = create_product(State(state.clone()), test_user(), form).await?;
    assert_eq!(status, StatusCode::CREATED);

    let product = response.0.data.expect("created product");
    assert_eq!(product.name, name);
    assert_eq!(product.price, 6500);
    assert_eq!(product.quantity, 0, "quantity defaults to zero");
    assert!(product.image_url.is_none(), "no upload, no stored path");
    assert!(product.category_id.is_none());

    // Missing price is rejected before anything is written.
    let form = multipart(&[("name", "No Price")]).await?;
    let missing_price = create_product(State(state.clone()), test_user(), form).await;
    assert!(matches!(missing_price, Err(AppError::BadRequest(_))));

    // Unparsable numeric field is a 400, not a 500.
    let form = multipart(&[("name", "Bad Price"), ("price", "ten")]).await?;
    let bad_price = create_product(State(state), test_user(), form).await;
    assert!(matches!(bad_price, Err(AppError::BadRequest(_))));

    Ok(())
}
