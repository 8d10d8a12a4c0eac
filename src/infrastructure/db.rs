use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uuid BLOB NOT NULL UNIQUE,
        title TEXT NOT NULL,
        title_ru TEXT,
        description TEXT NOT NULL DEFAULT '',
        description_source TEXT NOT NULL DEFAULT '',
        slug TEXT NOT NULL UNIQUE,
        cover_image TEXT,
        cover_image_source TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL,
        duration_sec INTEGER,
        status TEXT NOT NULL DEFAULT 'HIDDEN',
        promoted BOOLEAN NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS people (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uuid BLOB NOT NULL UNIQUE,
        name TEXT NOT NULL,
        name_ru TEXT,
        slug TEXT NOT NULL UNIQUE,
        gender TEXT NOT NULL,
        date_of_birth TEXT,
        description TEXT NOT NULL DEFAULT '',
        description_source TEXT NOT NULL DEFAULT '',
        photo TEXT,
        photo_source TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS link_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        caption TEXT NOT NULL,
        icon TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS narrations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uuid BLOB NOT NULL UNIQUE,
        book_id INTEGER NOT NULL,
        language TEXT NOT NULL,
        paid BOOLEAN NOT NULL DEFAULT 0,
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS links (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        narration_id INTEGER NOT NULL,
        url TEXT NOT NULL,
        link_type_id INTEGER NOT NULL,
        FOREIGN KEY (narration_id) REFERENCES narrations(id) ON DELETE CASCADE,
        FOREIGN KEY (link_type_id) REFERENCES link_types(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS book_authors (
        book_id INTEGER NOT NULL,
        person_id INTEGER NOT NULL,
        PRIMARY KEY (book_id, person_id),
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
        FOREIGN KEY (person_id) REFERENCES people(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS book_translators (
        book_id INTEGER NOT NULL,
        person_id INTEGER NOT NULL,
        PRIMARY KEY (book_id, person_id),
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
        FOREIGN KEY (person_id) REFERENCES people(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS book_tags (
        book_id INTEGER NOT NULL,
        tag_id INTEGER NOT NULL,
        PRIMARY KEY (book_id, tag_id),
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
        FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS narration_narrators (
        narration_id INTEGER NOT NULL,
        person_id INTEGER NOT NULL,
        PRIMARY KEY (narration_id, person_id),
        FOREIGN KEY (narration_id) REFERENCES narrations(id) ON DELETE CASCADE,
        FOREIGN KEY (person_id) REFERENCES people(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_books_status_date ON books(status, date)",
    "CREATE INDEX IF NOT EXISTS idx_narrations_book ON narrations(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_links_narration ON links(narration_id)",
];

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    for sql in MIGRATIONS {
        db.execute(Statement::from_string(backend, sql.to_string()))
            .await?;
    }

    tracing::debug!("Applied {} schema statements", MIGRATIONS.len());
    Ok(())
}
