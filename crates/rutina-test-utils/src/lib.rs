//! Test harness for rutina's database-backed tests.
//!
//! A single PostgreSQL server is shared per test binary: the one named by
//! `RUTINA_TEST_PG_URL`, or else a testcontainers instance started on first
//! use. Every test gets its own migrated database on that server, and
//! [`seed_coach`] fills it with a coach's client and catalog.

use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use rutina_db::config::DbConfig;
use rutina_db::models::{Client, Exercise};
use rutina_db::pool;
use rutina_db::queries::clients::insert_client;
use rutina_db::queries::exercises::{NewExercise, insert_exercise};

pub const PG_URL_ENV_VAR: &str = "RUTINA_TEST_PG_URL";

struct Server {
    base_url: String,
    _container: Option<ContainerAsync<Postgres>>,
}

static SERVER: OnceCell<Server> = OnceCell::const_new();

async fn start_server() -> Server {
    if let Ok(url) = std::env::var(PG_URL_ENV_VAR) {
        return Server {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("17")
        .start()
        .await
        .expect("postgres container should start");
    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port 5432");

    Server {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

fn db_config(base_url: &str, db_name: &str) -> DbConfig {
    DbConfig::new(format!("{base_url}/{db_name}"))
}

/// Server URL without a database name.
pub async fn pg_url() -> &'static str {
    &SERVER.get_or_init(start_server).await.base_url
}

/// Create a fresh migrated database. Returns `(pool, db_name)`; pass the
/// name to [`drop_test_db`] when done.
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!("rutina_test_{}", Uuid::new_v4().simple());
    let config = db_config(pg_url().await, &db_name);

    pool::ensure_database_exists(&config)
        .await
        .unwrap_or_else(|e| panic!("failed to create {db_name}: {e:#}"));
    let db = pool::create_pool(&config)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {db_name}: {e:#}"));
    pool::run_migrations(&db).await.expect("migrations should apply");

    (db, db_name)
}

/// Drop a database made by [`create_test_db`]. Failures are ignored so a
/// broken cleanup never masks the test's own result.
pub async fn drop_test_db(db_name: &str) {
    let config = db_config(pg_url().await, db_name);
    let _ = pool::drop_database(&config).await;
}

/// A coach with one client and a small catalog.
///
/// Library entries: "Press banca" and "Aperturas" (Pecho), "Fondos"
/// (Tríceps). Coach-owned: "Remo" (Espalda).
pub struct CoachFixture {
    pub coach_id: Uuid,
    pub client: Client,
    pub catalog: Vec<Exercise>,
}

impl CoachFixture {
    /// Catalog entry by exact name.
    pub fn exercise(&self, name: &str) -> &Exercise {
        self.catalog
            .iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("no fixture exercise named {name:?}"))
    }

    /// Catalog id as the wizard sees it.
    pub fn exercise_id(&self, name: &str) -> String {
        self.exercise(name).id.to_string()
    }
}

const LIBRARY: [(&str, &str); 3] = [
    ("Press banca", "Pecho"),
    ("Aperturas", "Pecho"),
    ("Fondos", "Tríceps"),
];

const COACH_OWNED: [(&str, &str); 1] = [("Remo", "Espalda")];

/// Insert a new coach's client and catalog into `db`.
pub async fn seed_coach(db: &PgPool) -> CoachFixture {
    let coach_id = Uuid::new_v4();
    let client = insert_client(db, coach_id, "Ana", "ana@example.com")
        .await
        .expect("fixture client");

    let owned = COACH_OWNED.iter().map(|entry| (Some(coach_id), entry));
    let library = LIBRARY.iter().map(|entry| (None, entry));
    let mut catalog = Vec::new();
    for (owner, (name, group)) in library.chain(owned) {
        let new = NewExercise {
            coach_id: owner,
            name: (*name).to_owned(),
            muscle_group: (*group).to_owned(),
            image_url: None,
            video_url: None,
        };
        catalog.push(insert_exercise(db, &new).await.expect("fixture exercise"));
    }

    CoachFixture {
        coach_id,
        client,
        catalog,
    }
}
