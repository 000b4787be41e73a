use luminor_backend::{
    auth::hash_password,
    models::{ROLE_ADMIN, UserInput},
    repository::{PostgresRepository, Repository},
};
use sqlx::postgres::PgPoolOptions;

const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// seed
///
/// Creates the first admin account so the panel can be logged into. Running it
/// again is a no-op once the account exists.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,luminor_backend=info".into()),
        )
        .init();

    let db_url = std::env::var("DATABASE_URL").expect("FATAL: DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to apply database migrations.");

    let repo = PostgresRepository::new(pool);

    match repo.get_user_by_email(DEFAULT_ADMIN_EMAIL).await {
        Ok(Some(_)) => {
            tracing::info!(email = DEFAULT_ADMIN_EMAIL, "admin already exists, nothing to do");
            return;
        }
        Ok(None) => {}
        Err(e) => panic!("FATAL: cannot look up admin account: {e}"),
    }

    let password = std::env::var("SEED_ADMIN_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
    let hash = hash_password(&password).expect("FATAL: cannot hash admin password");

    let admin = UserInput {
        name: "Admin".to_string(),
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        role: ROLE_ADMIN.to_string(),
        password: Some(hash),
        can_login: true,
        ..Default::default()
    };

    match repo.create_user(admin).await {
        Ok(user) => tracing::info!(user_id = %user.uuid, email = %user.email, "admin seeded"),
        Err(e) => panic!("FATAL: cannot create admin account: {e}"),
    }
}
