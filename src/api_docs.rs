use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::catalog::home,
        api::catalog::catalog,
        api::catalog::catalog_for_tag,
        api::tag::list_tags,
        api::books::book_detail,
        api::people::person_detail,
        api::search::search,
        api::stats::birthdays,
        api::sitemap::sitemap,
        api::data::get_data_json,
        api::maintenance::push_search_index,
        api::maintenance::generate_data_json,
        api::maintenance::update_read_by_author_tag,
    ),
    tags(
        (name = "audiobooks", description = "Audiobook catalog API")
    )
)]
pub struct ApiDoc;
