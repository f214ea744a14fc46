use serde::Serialize;

/// One row of the registry's name-search listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub state: String,
    pub name: String,
    pub status: String,
    pub id: String,
    pub url: String,
}

/// Officer or participant attached to a filing, as shown next to a role
/// label on the detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleEntry {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// A document filed against the entity, with its rebuilt download url.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentEntry {
    pub name: String,
    pub date: String,
    pub url: String,
}

/// Full snapshot of one entity's detail page. Fields are `None`/empty when
/// the matching section is absent from the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub state: String,
    pub name: Option<String>,
    pub registration_number: Option<String>,
    pub entity_type: Option<String>,
    pub status: Option<String>,
    pub date_registered: Option<String>,
    pub agent_name: Option<String>,
    pub agent_address: Option<String>,
    pub mailing_address: Option<String>,
    pub presidents: Vec<RoleEntry>,
    pub secretaries: Vec<RoleEntry>,
    pub registrants: Vec<RoleEntry>,
    pub members: Vec<RoleEntry>,
    pub managers: Vec<RoleEntry>,
    pub documents: Vec<DocumentEntry>,
}

/// Officer/participant categories the registry labels with 3-letter codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoleCode {
    President,
    Secretary,
    Registrant,
    Member,
    Manager,
}

impl RoleCode {
    pub fn label(&self) -> &'static str {
        match self {
            RoleCode::President => "PRE",
            RoleCode::Secretary => "SEC",
            RoleCode::Registrant => "REG",
            RoleCode::Member => "MEM",
            RoleCode::Manager => "MGR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RoleCode;

    #[test]
    fn role_codes_match_registry_labels() {
        let codes = [
            (RoleCode::President, "PRE"),
            (RoleCode::Secretary, "SEC"),
            (RoleCode::Registrant, "REG"),
            (RoleCode::Member, "MEM"),
            (RoleCode::Manager, "MGR"),
        ];
        for (code, label) in codes {
            assert_eq!(code.label(), label);
        }
    }
}
