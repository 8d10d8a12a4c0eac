use crate::models::{
    book, book_authors, book_tags, link, link_type, narration, narration_narrators, person, tag,
    BookStatus, Gender, Language,
};
use chrono::NaiveDate;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

struct DemoBook {
    title: &'static str,
    slug: &'static str,
    date: (i32, u32, u32),
    duration_sec: i64,
    author: &'static str,
    narrator: &'static str,
    language: Language,
    paid: bool,
    link_type: &'static str,
    tags: &'static [&'static str],
    promoted: bool,
}

const DEMO_BOOKS: &[DemoBook] = &[
    DemoBook {
        title: "Новая зямля",
        slug: "novaja-ziamlia",
        date: (2021, 3, 4),
        duration_sec: 36_000,
        author: "jakub-kolas",
        narrator: "jakub-kolas",
        language: Language::Belarusian,
        paid: false,
        link_type: "knihi_com",
        tags: &["klasiki-bielaruskaj-litaratury", "cytaje-autar"],
        promoted: true,
    },
    DemoBook {
        title: "Сымон-музыка",
        slug: "symon-muzyka",
        date: (2022, 6, 11),
        duration_sec: 18_500,
        author: "jakub-kolas",
        narrator: "alena-kryvaja",
        language: Language::Belarusian,
        paid: true,
        link_type: "litres",
        tags: &["klasiki-bielaruskaj-litaratury"],
        promoted: false,
    },
    DemoBook {
        title: "Вянок",
        slug: "vianok",
        date: (2023, 1, 20),
        duration_sec: 7_200,
        author: "maksim-bahdanovic",
        narrator: "alena-kryvaja",
        language: Language::Belarusian,
        paid: false,
        link_type: "youtube",
        tags: &["klasiki-bielaruskaj-litaratury", "dzieciam-i-padletkam"],
        promoted: false,
    },
];

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if book::Entity::find().one(db).await?.is_some() {
        tracing::info!("Catalog is not empty, skipping demo data");
        return Ok(());
    }

    // 1. Link types
    for (name, caption) in [
        ("knihi_com", "Knihi.com"),
        ("litres", "ЛітРэс"),
        ("youtube", "YouTube"),
    ] {
        let model = link_type::ActiveModel {
            name: Set(name.to_owned()),
            caption: Set(caption.to_owned()),
            icon: Set(None),
            ..Default::default()
        };
        link_type::Entity::insert(model)
            .on_conflict(OnConflict::column(link_type::Column::Name).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    // 2. Tags
    for (name, slug) in [
        ("Класікі беларускай літаратуры", "klasiki-bielaruskaj-litaratury"),
        ("Сучасная проза", "sucasnaja-proza"),
        ("Дзецям і падлеткам", "dzieciam-i-padletkam"),
        ("Чытае аўтар", "cytaje-autar"),
    ] {
        let model = tag::ActiveModel {
            name: Set(name.to_owned()),
            slug: Set(slug.to_owned()),
            ..Default::default()
        };
        tag::Entity::insert(model)
            .on_conflict(OnConflict::column(tag::Column::Slug).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    // 3. People
    for (name, slug, gender, born) in [
        ("Якуб Колас", "jakub-kolas", Gender::Male, NaiveDate::from_ymd_opt(1882, 11, 3)),
        ("Максім Багдановіч", "maksim-bahdanovic", Gender::Male, NaiveDate::from_ymd_opt(1891, 12, 9)),
        ("Алена Крывая", "alena-kryvaja", Gender::Female, None),
    ] {
        let model = person::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4()),
            name: Set(name.to_owned()),
            name_ru: Set(None),
            slug: Set(slug.to_owned()),
            gender: Set(gender),
            date_of_birth: Set(born),
            description: Set(String::new()),
            description_source: Set(String::new()),
            photo: Set(None),
            photo_source: Set(String::new()),
            ..Default::default()
        };
        person::Entity::insert(model)
            .on_conflict(OnConflict::column(person::Column::Slug).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    // 4. Books with one narration and one link each
    for demo in DEMO_BOOKS {
        let (y, m, d) = demo.date;
        let date = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| DbErr::Custom(format!("Invalid demo date for {}", demo.slug)))?;

        let saved = book::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4()),
            title: Set(demo.title.to_owned()),
            title_ru: Set(None),
            description: Set(String::new()),
            description_source: Set(String::new()),
            slug: Set(demo.slug.to_owned()),
            cover_image: Set(None),
            cover_image_source: Set(String::new()),
            date: Set(date),
            duration_sec: Set(Some(demo.duration_sec)),
            status: Set(BookStatus::Active),
            promoted: Set(demo.promoted),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let author = find_person(db, demo.author).await?;
        let narrator = find_person(db, demo.narrator).await?;

        book_authors::ActiveModel {
            book_id: Set(saved.id),
            person_id: Set(author.id),
        }
        .insert(db)
        .await?;

        for slug in demo.tags {
            if let Some(tag) = tag::Entity::find()
                .filter(tag::Column::Slug.eq(*slug))
                .one(db)
                .await?
            {
                book_tags::ActiveModel {
                    book_id: Set(saved.id),
                    tag_id: Set(tag.id),
                }
                .insert(db)
                .await?;
            }
        }

        let narration = narration::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4()),
            book_id: Set(saved.id),
            language: Set(demo.language),
            paid: Set(demo.paid),
            ..Default::default()
        }
        .insert(db)
        .await?;

        narration_narrators::ActiveModel {
            narration_id: Set(narration.id),
            person_id: Set(narrator.id),
        }
        .insert(db)
        .await?;

        if let Some(link_type) = link_type::Entity::find()
            .filter(link_type::Column::Name.eq(demo.link_type))
            .one(db)
            .await?
        {
            link::ActiveModel {
                narration_id: Set(narration.id),
                url: Set(format!("https://example.org/{}", demo.slug)),
                link_type_id: Set(link_type.id),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    tracing::info!("Seeded {} demo books", DEMO_BOOKS.len());
    Ok(())
}

async fn find_person(db: &DatabaseConnection, slug: &str) -> Result<person::Model, DbErr> {
    person::Entity::find()
        .filter(person::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Demo person {}", slug)))
}
