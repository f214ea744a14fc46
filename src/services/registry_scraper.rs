use url::Url;

use crate::{
    configuration::ScraperSettings,
    domain::company::{EntityRecord, SearchResult},
};

use super::{
    detail_parser::{parse_detail_page, DetailPageResult},
    scout::fetch_page_source,
    search_parser::{parse_search_page, SearchPageResult},
};

// Render signals: the search listing is the third table of the form, a
// detail page is ready once its form is visible.
pub const SEARCH_LANDMARK: &str = "body > form > table:nth-child(3)";
pub const DETAIL_LANDMARK: &str = "body > form";

const SEARCH_URL: &str = "https://egov.sos.state.or.us/br/pkg_web_name_srch_inq.do_name_srch";

/// Name-search url with the fixed phase and status filters the registry
/// expects (active and inactive entities, phase-1 match).
pub fn build_search_url(company_name: &str) -> String {
    Url::parse_with_params(
        SEARCH_URL,
        &[
            ("p_name", company_name),
            ("p_regist_nbr", ""),
            ("p_srch", "PHASE1"),
            ("p_print", "FALSE"),
            ("p_entity_status", "ACTINA"),
        ],
    )
    .unwrap()
    .to_string()
}

/// Run a name search and return its summary listing. Session failures and
/// unrecognized layouts are logged and degrade to an empty listing.
pub async fn search_companies(settings: &ScraperSettings, company_name: &str) -> Vec<SearchResult> {
    let url = build_search_url(company_name);
    let html = match fetch_page_source(&settings.remote_url, &url, SEARCH_LANDMARK).await {
        Ok(html) => html,
        Err(e) => {
            log::error!("Error fetching search results for '{}': {:?}", company_name, e);
            return vec![];
        }
    };

    match parse_search_page(&html, &settings.state) {
        SearchPageResult::Records(records) => {
            log::info!("Found {} listings for '{}'", records.len(), company_name);
            records
        }
        SearchPageResult::Unrecognized => {
            log::error!("Search results layout not recognized for '{}'", company_name);
            vec![]
        }
    }
}

/// Fetch one entity's detail page and extract its record. Same degradation
/// contract as [`search_companies`]: callers never see an error.
pub async fn company_details(settings: &ScraperSettings, url: &str) -> Option<EntityRecord> {
    let html = match fetch_page_source(&settings.remote_url, url, DETAIL_LANDMARK).await {
        Ok(html) => html,
        Err(e) => {
            log::error!("Error fetching details from '{}': {:?}", url, e);
            return None;
        }
    };

    match parse_detail_page(&html, &settings.state) {
        DetailPageResult::Record(record) => Some(record),
        DetailPageResult::Unrecognized => {
            log::error!("Detail page layout not recognized at '{}'", url);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::build_search_url;

    #[test]
    fn search_url_carries_name_and_fixed_filters() {
        let url = build_search_url("ACME WIDGETS");

        assert!(url.starts_with(
            "https://egov.sos.state.or.us/br/pkg_web_name_srch_inq.do_name_srch?"
        ));
        assert!(url.contains("p_name=ACME+WIDGETS"));
        assert!(url.contains("p_srch=PHASE1"));
        assert!(url.contains("p_print=FALSE"));
        assert!(url.contains("p_entity_status=ACTINA"));
    }
}
