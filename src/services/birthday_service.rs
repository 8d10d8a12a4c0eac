//! Birthday Service - upcoming birthdays of authors, translators and narrators
//!
//! People are ordered by `month * 31 + day` and the list is rotated to start
//! at today, so the ones whose birthday is next come first.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::domain::DomainError;
use crate::models::{book_authors, book_translators, narration_narrators, person};

pub const MAX_BIRTHDAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBirthday {
    pub person: person::Model,
    pub date_of_birth: NaiveDate,
    /// Years between the birth year and today's year.
    pub age: i32,
    pub next_birthday: NaiveDate,
    pub days_left: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BirthdayEntry {
    #[serde(flatten)]
    pub birthday: RankedBirthday,
    pub books_authored: usize,
    pub books_translated: usize,
    pub narrations: usize,
}

fn day_proxy(date: NaiveDate) -> u32 {
    date.month() * 31 + date.day()
}

/// Birthday in `year`; Feb 29 falls on Feb 28 in non-leap years.
fn birthday_in(year: i32, born: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, born.month(), born.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, born.month(), born.day() - 1))
}

fn next_birthday(born: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = birthday_in(today.year(), born)?;
    if this_year < today {
        birthday_in(today.year() + 1, born)
    } else {
        Some(this_year)
    }
}

/// Rank people with a known birth date by closeness of their next birthday.
pub fn rank_birthdays(mut people: Vec<person::Model>, today: NaiveDate) -> Vec<RankedBirthday> {
    people.retain(|p| p.date_of_birth.is_some());
    people.sort_by_key(|p| (p.date_of_birth.map(day_proxy), p.id));

    let today_proxy = day_proxy(today);
    let start = people.partition_point(|p| p.date_of_birth.map(day_proxy) < Some(today_proxy));
    people.rotate_left(start);

    people
        .into_iter()
        .take(MAX_BIRTHDAYS)
        .filter_map(|person| {
            let born = person.date_of_birth?;
            let next = next_birthday(born, today)?;
            Some(RankedBirthday {
                age: today.year() - born.year(),
                days_left: (next - today).num_days(),
                next_birthday: next,
                date_of_birth: born,
                person,
            })
        })
        .collect()
}

fn count_by_person(person_ids: impl Iterator<Item = i32>) -> HashMap<i32, usize> {
    let mut counts = HashMap::new();
    for id in person_ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

/// Upcoming birthdays as of `today`, with each person's contribution counts.
pub async fn get_birthdays(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Vec<BirthdayEntry>, DomainError> {
    let people = person::Entity::find()
        .filter(person::Column::DateOfBirth.is_not_null())
        .order_by_asc(person::Column::Id)
        .all(db)
        .await?;
    let ranked = rank_birthdays(people, today);
    let ids: Vec<i32> = ranked.iter().map(|r| r.person.id).collect();

    let authored = book_authors::Entity::find()
        .filter(book_authors::Column::PersonId.is_in(ids.clone()))
        .all(db)
        .await?;
    let translated = book_translators::Entity::find()
        .filter(book_translators::Column::PersonId.is_in(ids.clone()))
        .all(db)
        .await?;
    let narrated = narration_narrators::Entity::find()
        .filter(narration_narrators::Column::PersonId.is_in(ids))
        .all(db)
        .await?;

    let authored = count_by_person(authored.iter().map(|r| r.person_id));
    let translated = count_by_person(translated.iter().map(|r| r.person_id));
    let narrated = count_by_person(narrated.iter().map(|r| r.person_id));

    Ok(ranked
        .into_iter()
        .map(|birthday| {
            let id = birthday.person.id;
            BirthdayEntry {
                books_authored: authored.get(&id).copied().unwrap_or(0),
                books_translated: translated.get(&id).copied().unwrap_or(0),
                narrations: narrated.get(&id).copied().unwrap_or(0),
                birthday,
            }
        })
        .collect())
}
