//! Demo users and trips for local development.

use tracing::info;

use crate::{
    auth::{self, AuthenticatedUser},
    db::DbPool,
    error::AppError,
    models::trip::TripPayload,
    services::trips::TripService,
};

pub const DEMO_PASSWORD: &str = "password123";

struct DemoTrip {
    owner: usize,
    title: &'static str,
    description: &'static str,
    location: &'static str,
    start_date: &'static str,
    end_date: &'static str,
    latitude: f64,
    longitude: f64,
    total_cost: f64,
    image_label: &'static str,
    is_public: bool,
}

const DEMO_USERS: [(&str, &str); 2] = [
    ("Иван Петров", "user1@example.com"),
    ("Мария Сидорова", "user2@example.com"),
];

const DEMO_TRIPS: [DemoTrip; 5] = [
    DemoTrip {
        owner: 0,
        title: "Поездка в Санкт-Петербург",
        description: "Удивительное путешествие в культурную столицу России. Посетили Эрмитаж, Петергоф и другие достопримечательности.",
        location: "Санкт-Петербург, Россия",
        start_date: "2023-06-10",
        end_date: "2023-06-17",
        latitude: 59.9343,
        longitude: 30.3351,
        total_cost: 45000.0,
        image_label: "Санкт-Петербург",
        is_public: true,
    },
    DemoTrip {
        owner: 0,
        title: "Отдых в Сочи",
        description: "Прекрасный отпуск на Черноморском побережье. Чистое море, жаркое солнце и вкусная еда!",
        location: "Сочи, Россия",
        start_date: "2023-07-20",
        end_date: "2023-07-31",
        latitude: 43.6028,
        longitude: 39.7342,
        total_cost: 65000.0,
        image_label: "Сочи",
        is_public: true,
    },
    DemoTrip {
        owner: 0,
        title: "Выходные в Казани",
        description: "Короткая поездка на выходные в Казань. Посетили Казанский Кремль и другие интересные места.",
        location: "Казань, Россия",
        start_date: "2023-08-12",
        end_date: "2023-08-14",
        latitude: 55.7887,
        longitude: 49.1221,
        total_cost: 20000.0,
        image_label: "Казань",
        is_public: false,
    },
    DemoTrip {
        owner: 1,
        title: "Поход на Алтай",
        description: "Незабываемый поход по Горному Алтаю. Красивейшие пейзажи, чистый воздух и полное единение с природой.",
        location: "Горный Алтай, Россия",
        start_date: "2023-06-01",
        end_date: "2023-06-10",
        latitude: 50.7747,
        longitude: 86.1566,
        total_cost: 35000.0,
        image_label: "Алтай",
        is_public: true,
    },
    DemoTrip {
        owner: 1,
        title: "Отпуск в Турции",
        description: "Замечательный отдых в Анталии. All-inclusive отель, теплое море и множество экскурсий.",
        location: "Анталия, Турция",
        start_date: "2023-09-05",
        end_date: "2023-09-15",
        latitude: 36.8969,
        longitude: 30.7133,
        total_cost: 80000.0,
        image_label: "Турция",
        is_public: true,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub trips: usize,
}

/// Idempotent for users (matched by email); trips are wiped and recreated.
pub async fn seed_demo_data(db: &DbPool) -> Result<SeedReport, AppError> {
    let mut owners = Vec::with_capacity(DEMO_USERS.len());
    for (name, email) in DEMO_USERS {
        owners.push(upsert_user(db, name, email).await?);
    }
    info!("seeded {} users", owners.len());

    sqlx::query("DELETE FROM trips").execute(db).await?;

    let trips = TripService::new(db.clone());
    for demo in &DEMO_TRIPS {
        let owner = &owners[demo.owner];
        let payload = TripPayload {
            title: Some(demo.title.into()),
            description: Some(demo.description.into()),
            location: Some(demo.location.into()),
            start_date: Some(demo.start_date.into()),
            end_date: Some(demo.end_date.into()),
            latitude: Some(demo.latitude),
            longitude: Some(demo.longitude),
            total_cost: Some(demo.total_cost),
            image_url: Some(format!(
                "https://via.placeholder.com/800x600?text={}",
                demo.image_label
            )),
            is_public: Some(demo.is_public),
            user_id: Some(owner.id.clone()),
        };
        trips.create(Some(owner), payload).await?;
    }
    info!("seeded {} trips", DEMO_TRIPS.len());

    Ok(SeedReport {
        users: owners.len(),
        trips: DEMO_TRIPS.len(),
    })
}

async fn upsert_user(db: &DbPool, name: &str, email: &str) -> Result<AuthenticatedUser, AppError> {
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
        .bind(email)
        .fetch_optional(db)
        .await?;

    let id = match existing {
        Some(id) => id,
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            sqlx::query(
                r#"INSERT INTO users (id, name, email, password_hash, image, created_at)
                   VALUES (?1, ?2, ?3, ?4, NULL, ?5)"#,
            )
            .bind(&id)
            .bind(name)
            .bind(email)
            .bind(auth::hash_password(DEMO_PASSWORD)?)
            .bind(chrono::Utc::now())
            .execute(db)
            .await?;
            id
        }
    };

    Ok(AuthenticatedUser {
        id,
        name: name.to_string(),
        email: email.to_string(),
    })
}
