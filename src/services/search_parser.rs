use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};

use crate::domain::company::SearchResult;

const DETAIL_URL_PREFIX: &str = "https://egov.sos.state.or.us/br/";

// The listing is the third child of the search form; the two tables before it
// hold the search widgets. Fixed layout contract of the legacy site.
const RESULTS_TABLE: &str = "body > form > table:nth-child(3)";
const RESULTS_ROWS: &str = "body > form > table:nth-child(3) > tbody > tr";

#[derive(Debug, PartialEq)]
pub enum SearchPageResult {
    /// The results table is gone; the site layout has drifted.
    Unrecognized,
    Records(Vec<SearchResult>),
}

/// Extract the summary listing from a search-results page. Rows are read at
/// fixed column positions (status, registry-number link, name link); a row
/// with too few cells is dropped, a row with a missing link keeps empty
/// strings for the affected fields.
pub fn parse_search_page(html: &str, state: &str) -> SearchPageResult {
    let table_selector = Selector::parse(RESULTS_TABLE).unwrap();
    let row_selector = Selector::parse(RESULTS_ROWS).unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let document = Html::parse_document(html);
    if document.select(&table_selector).next().is_none() {
        return SearchPageResult::Unrecognized;
    }

    let mut records = vec![];
    for row in document.select(&row_selector).skip(1) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        let (Some(status_cell), Some(id_cell), Some(name_cell)) =
            (cells.get(2), cells.get(3), cells.get(5))
        else {
            continue;
        };

        let registry_link = id_cell.select(&link_selector).next();
        let name_link = name_cell.select(&link_selector).next();

        records.push(SearchResult {
            state: state.to_string(),
            name: name_link.map(text_content).unwrap_or_default(),
            status: text_content(*status_cell),
            id: registry_link.map(text_content).unwrap_or_default(),
            url: registry_link
                .and_then(|link| link.attr("href"))
                .map(|href| format!("{}{}", DETAIL_URL_PREFIX, href))
                .unwrap_or_default(),
        });
    }

    SearchPageResult::Records(records)
}

fn text_content(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{parse_search_page, SearchPageResult};

    const SEARCH_PAGE: &str = r#"
    <html><body><form>
    <input type="hidden" name="p_srch" value="PHASE1">
    <table><tr><td><a href="pkg_web_name_srch_inq.do_name_srch">New Search</a></td></tr></table>
    <table>
      <tr>
        <td>&nbsp;</td><td>Type</td><td>Status</td>
        <td>Registry Nbr</td><td>Assumed</td><td>Entity Name</td>
      </tr>
      <tr>
        <td>1</td><td>DLLC</td><td>ACT</td>
        <td><a href="pkg_web_name_srch_inq.show_detl?p_be_rsn=100001">1843693-94</a></td>
        <td></td>
        <td><a href="pkg_web_name_srch_inq.show_detl?p_be_rsn=100001">ACME WIDGETS LLC</a></td>
      </tr>
      <tr>
        <td>2</td><td>DBC</td><td>INA</td>
        <td>655512-80</td>
        <td></td>
        <td>NO LINK COMPANY</td>
      </tr>
      <tr>
        <td>3</td><td>truncated row</td>
      </tr>
      <tr>
        <td>4</td><td>ABN</td><td>ACT</td>
        <td><a href="pkg_web_name_srch_inq.show_detl?p_be_rsn=100004">201544-99</a></td>
        <td></td>
        <td><a href="pkg_web_name_srch_inq.show_detl?p_be_rsn=100004">BEAVER STATE FARMS</a></td>
      </tr>
    </table>
    </form></body></html>
    "#;

    #[test]
    fn parses_every_well_formed_row() {
        let result = parse_search_page(SEARCH_PAGE, "OR");
        let SearchPageResult::Records(records) = result else {
            panic!("expected records");
        };

        // 4 data rows, one of which is dropped for its missing cells
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].state, "OR");
        assert_eq!(records[0].name, "ACME WIDGETS LLC");
        assert_eq!(records[0].status, "ACT");
        assert_eq!(records[0].id, "1843693-94");
        assert_eq!(
            records[0].url,
            "https://egov.sos.state.or.us/br/pkg_web_name_srch_inq.show_detl?p_be_rsn=100001"
        );

        assert_eq!(records[2].name, "BEAVER STATE FARMS");
        assert_eq!(records[2].id, "201544-99");
    }

    #[test]
    fn row_without_links_keeps_empty_fields() {
        let SearchPageResult::Records(records) = parse_search_page(SEARCH_PAGE, "OR") else {
            panic!("expected records");
        };

        assert_eq!(records[1].status, "INA");
        assert_eq!(records[1].name, "");
        assert_eq!(records[1].id, "");
        assert_eq!(records[1].url, "");
    }

    #[test]
    fn missing_results_table_is_unrecognized() {
        let html = "<html><body><form><table><tr><td>filters</td></tr></table></form></body></html>";
        assert_eq!(parse_search_page(html, "OR"), SearchPageResult::Unrecognized);
    }

    #[test]
    fn header_only_table_yields_no_records() {
        let html = r#"
        <html><body><form>
        <div></div>
        <div></div>
        <table><tr><td>&nbsp;</td><td>Type</td><td>Status</td><td>Registry Nbr</td><td>Assumed</td><td>Entity Name</td></tr></table>
        </form></body></html>
        "#;
        assert_eq!(
            parse_search_page(html, "OR"),
            SearchPageResult::Records(vec![])
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let first = parse_search_page(SEARCH_PAGE, "OR");
        let second = parse_search_page(SEARCH_PAGE, "OR");
        assert_eq!(first, second);
    }
}
