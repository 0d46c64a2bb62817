use better_view_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::auth::{LoginRequest, RegisterRequest},
    error::AppError,
    services::auth_service,
};
use uuid::Uuid;

fn unauthorized_message(err: AppError) -> String {
    match err {
        AppError::Unauthorized(msg) => msg,
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn register_and_login_flow() -> anyhow::Result<()> {
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

    // set_var is unsafe in edition 2024; fine in a single-purpose test binary.
    unsafe { std::env::set_var("JWT_SECRET", "test-secret") };

    let email = format!("somsri-{}@example.com", Uuid::new_v4());

    let registered = auth_service::register_user(
        &pool,
        RegisterRequest {
            name: "Somsri".into(),
            email: email.clone(),
            password: "s3cret-pass".into(),
            role: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(registered.role, "user");
    assert_eq!(registered.email, email);

    // Duplicate email is rejected and no second row appears.
    let duplicate = auth_service::register_user(
        &pool,
        RegisterRequest {
            name: "Somsri Again".into(),
            email: email.clone(),
            password: "other-pass".into(),
            role: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let count: (i64,) = sqlx::query_as("SELECT count(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await?;
    assert_eq!(count.0, 1);

    // Wrong password and unknown email answer identically.
    let wrong_password = auth_service::login_user(
        &pool,
        LoginRequest {
            email: email.clone(),
            password: "not-the-password".into(),
        },
    )
    .await
    .unwrap_err();
    let unknown_email = auth_service::login_user(
        &pool,
        LoginRequest {
            email: format!("nobody-{}@example.com", Uuid::new_v4()),
            password: "whatever".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(
        unauthorized_message(wrong_password),
        unauthorized_message(unknown_email)
    );

    // Correct credentials return a token plus the public user fields.
    let login = auth_service::login_user(
        &pool,
        LoginRequest {
            email: email.clone(),
            password: "s3cret-pass".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!login.token.is_empty());
    assert_eq!(login.user.email, email);

    Ok(())
}
