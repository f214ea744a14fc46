use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::domain::company::{DocumentEntry, EntityRecord, RoleCode, RoleEntry};

const DOCUMENT_URL_PREFIX: &str = "https://records.sos.state.or.us/ORSOSWebDrawer/Record";
const INDICATOR_TEXT: &str = "(?i)authorized representative address is the mailing address";

#[derive(Debug, PartialEq)]
pub enum DetailPageResult {
    /// None of the detail-page landmarks matched; the site layout has
    /// drifted or this is not a detail page.
    Unrecognized,
    Record(EntityRecord),
}

/// Extract one entity record from a detail page. Six independent extractions
/// feed the record; each tolerates missing structure on its own, so a gap in
/// one section never empties the others.
pub fn parse_detail_page(html: &str, state: &str) -> DetailPageResult {
    let document = Html::parse_document(html);

    let registry_info = extract_registry_info(&document);
    let (agent_name, agent_address) = extract_registered_agent(&document);
    let mailing_address = extract_mailing_address(&document);
    let name = extract_entity_name(&document);
    let presidents = extract_roles(&document, RoleCode::President);
    let secretaries = extract_roles(&document, RoleCode::Secretary);
    let registrants = extract_roles(&document, RoleCode::Registrant);
    let members = extract_roles(&document, RoleCode::Member);
    let managers = extract_roles(&document, RoleCode::Manager);
    let documents = extract_documents(&document);

    let no_landmark = registry_info.is_none()
        && agent_name.is_none()
        && agent_address.is_none()
        && mailing_address.is_none()
        && name.is_none()
        && presidents.is_empty()
        && secretaries.is_empty()
        && registrants.is_empty()
        && members.is_empty()
        && managers.is_empty()
        && documents.is_empty();
    if no_landmark {
        return DetailPageResult::Unrecognized;
    }

    let registry_info = registry_info.unwrap_or_default();
    DetailPageResult::Record(EntityRecord {
        state: state.to_string(),
        name,
        registration_number: registry_info.registration_number,
        entity_type: registry_info.entity_type,
        status: registry_info.status,
        date_registered: registry_info.date_registered,
        agent_name,
        agent_address,
        mailing_address,
        presidents,
        secretaries,
        registrants,
        members,
        managers,
        documents,
    })
}

#[derive(Debug, Default)]
struct RegistryInfo {
    registration_number: Option<String>,
    entity_type: Option<String>,
    status: Option<String>,
    date_registered: Option<String>,
}

/// The "Registry Nbr" header row is followed by a data row of five cells:
/// registration number (first token), entity type, status, jurisdiction
/// (unused) and registry date.
fn extract_registry_info(document: &Html) -> Option<RegistryInfo> {
    let cell_selector = Selector::parse("td").unwrap();
    let label = find_label_cell(document, &Regex::new("(?i)registry nbr").unwrap())?;
    let header_row = ancestor_element(label, "tr")?;
    let data_row = next_sibling_element(header_row, "tr")?;

    let cells: Vec<ElementRef> = data_row.select(&cell_selector).collect();
    if cells.len() < 5 {
        return None;
    }

    let number_cell = text_content(cells[0]);
    Some(RegistryInfo {
        registration_number: number_cell.split_whitespace().next().map(str::to_string),
        entity_type: Some(text_content(cells[1])),
        status: Some(text_content(cells[2])),
        date_registered: Some(text_content(cells[4])),
    })
}

/// The table after the "REGISTERED AGENT" label table carries the agent name
/// in every cell but the first (at most three are kept); the address is the
/// second cell of the first following table that has one.
fn extract_registered_agent(document: &Html) -> (Option<String>, Option<String>) {
    let cell_selector = Selector::parse("td").unwrap();
    let Some(label) = find_label_cell(document, &Regex::new("(?i)registered agent").unwrap())
    else {
        return (None, None);
    };
    let Some(name_table) = ancestor_element(label, "table")
        .and_then(|table| next_sibling_element(table, "table"))
    else {
        return (None, None);
    };

    let name = name_table
        .select(&cell_selector)
        .skip(1)
        .take(3)
        .map(text_content)
        .filter(|part| !part.is_empty())
        .join(" ");
    let name = (!name.is_empty()).then_some(name);

    let mut address = None;
    let mut table = name_table;
    for _ in 0..3 {
        let Some(next) = next_sibling_element(table, "table") else {
            break;
        };
        if let Some(lines) = second_cell(next).and_then(cell_lines) {
            address = Some(lines);
            break;
        }
        table = next;
    }

    (name, address)
}

/// Default case reads the table after the "MAILING ADDRESS" label. When the
/// page carries the authorized-representative indicator note, the mailing
/// address lives three tables past the "AUTHORIZED REPRESENTATIVE" label's
/// table instead, and the default branch is not consulted.
fn extract_mailing_address(document: &Html) -> Option<String> {
    let font_selector = Selector::parse("font").unwrap();
    let indicator_regex = Regex::new(INDICATOR_TEXT).unwrap();
    let indicator = document
        .select(&font_selector)
        .any(|font| indicator_regex.is_match(&text_content(font)));

    if indicator {
        let label =
            find_label_cell(document, &Regex::new("(?i)authorized representative").unwrap())?;
        let mut table = ancestor_element(label, "table")?;
        for _ in 0..3 {
            table = next_sibling_element(table, "table")?;
        }
        return second_cell(table).and_then(cell_lines);
    }

    let label = find_label_cell(document, &Regex::new("(?i)mailing address").unwrap())?;
    let table = next_sibling_element(ancestor_element(label, "table")?, "table")?;
    second_cell(table).and_then(cell_lines)
}

/// One entry per cell whose text is exactly the role code. The name sits in
/// the next sibling table (every cell but the first), the address in the
/// second cell of the table after that.
fn extract_roles(document: &Html, code: RoleCode) -> Vec<RoleEntry> {
    let cell_selector = Selector::parse("td").unwrap();
    let label_regex = Regex::new(&format!("(?i)^{}$", regex::escape(code.label()))).unwrap();

    let mut entries = vec![];
    for label in document
        .select(&cell_selector)
        .filter(|cell| cell.select(&cell_selector).next().is_none())
        .filter(|cell| label_regex.is_match(&text_content(*cell)))
    {
        let Some(name_table) = ancestor_element(label, "table")
            .and_then(|table| next_sibling_element(table, "table"))
        else {
            continue;
        };

        let name = name_table
            .select(&cell_selector)
            .skip(1)
            .map(text_content)
            .filter(|part| !part.is_empty())
            .join(" ");
        let address = next_sibling_element(name_table, "table")
            .and_then(second_cell)
            .and_then(cell_lines);

        entries.push(RoleEntry {
            name: (!name.is_empty()).then_some(name),
            address,
        });
    }
    entries
}

/// Every link into the records drawer names a filed document; the enclosing
/// row's second and third cells are its name and date, and the numeric id
/// rebuilds the canonical download url.
fn extract_documents(document: &Html) -> Vec<DocumentEntry> {
    let link_selector = Selector::parse("a").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let record_regex = Regex::new(r"ORSOSWebDrawer/Recordhtml/(\d+)").unwrap();

    let mut documents = vec![];
    for link in document.select(&link_selector) {
        let Some(href) = link.attr("href") else {
            continue;
        };
        let Some(captures) = record_regex.captures(href) else {
            continue;
        };

        let cells: Vec<ElementRef> = ancestor_element(link, "tr")
            .map(|row| row.select(&cell_selector).collect())
            .unwrap_or_default();

        documents.push(DocumentEntry {
            name: cells.get(1).copied().map(text_content).unwrap_or_default(),
            date: cells.get(2).copied().map(text_content).unwrap_or_default(),
            url: format!("{}/{}/File/document", DOCUMENT_URL_PREFIX, &captures[1]),
        });
    }
    documents
}

fn extract_entity_name(document: &Html) -> Option<String> {
    let label = find_label_cell(document, &Regex::new("(?i)entity name").unwrap())?;
    let name_cell = next_sibling_element(label, "td")?;
    Some(text_content(name_cell))
}

/// First cell, in document order, whose text matches `label`. Only leaf
/// cells count: the layout nests tables inside cells, and an enclosing cell
/// would match any label its section contains.
fn find_label_cell<'a>(document: &'a Html, label: &Regex) -> Option<ElementRef<'a>> {
    let cell_selector = Selector::parse("td").unwrap();
    document
        .select(&cell_selector)
        .filter(|cell| cell.select(&cell_selector).next().is_none())
        .find(|cell| label.is_match(&text_content(*cell)))
}

fn ancestor_element<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == name)
}

fn next_sibling_element<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == name)
}

fn second_cell(table: ElementRef) -> Option<ElementRef> {
    let cell_selector = Selector::parse("td").unwrap();
    table.select(&cell_selector).nth(1)
}

fn text_content(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join(" ")
}

/// Text fragments of a cell joined as address lines.
fn cell_lines(cell: ElementRef) -> Option<String> {
    let lines = cell
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join(", ");
    (!lines.is_empty()).then_some(lines)
}
