//! The server routes the lookups query, each paired with its list shape.

use octo_types::ResponseShape;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except unreserved characters gets encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// A request path relative to the server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    path: String,
    shape: ResponseShape,
}

impl ApiPath {
    /// `GET /api/environments/all`, a bare array of environments.
    pub fn environments_all() -> Self {
        Self {
            path: "/api/environments/all".into(),
            shape: ResponseShape::BareArray,
        }
    }

    /// `GET /api/environments/{id}/machines`, a paged `Items` envelope.
    pub fn environment_machines(environment_id: &str) -> Self {
        Self {
            path: format!("/api/environments/{}/machines", encode(environment_id)),
            shape: ResponseShape::ItemsEnvelope,
        }
    }

    /// `GET /api/machines/all`, a bare array of machines.
    pub fn machines_all() -> Self {
        Self {
            path: "/api/machines/all".into(),
            shape: ResponseShape::BareArray,
        }
    }

    /// `GET /api/projects?name={name}`, a paged `Items` envelope.
    pub fn projects_named(name: &str) -> Self {
        Self {
            path: format!("/api/projects?name={}", encode(name)),
            shape: ResponseShape::ItemsEnvelope,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn shape(&self) -> ResponseShape {
        self.shape
    }
}

fn encode(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_with_unreserved_characters_stay_readable() {
        assert_eq!(
            ApiPath::environment_machines("Environments-1").as_str(),
            "/api/environments/Environments-1/machines"
        );
    }

    #[test]
    fn names_are_percent_encoded() {
        assert_eq!(
            ApiPath::projects_named("Billing & Invoices").as_str(),
            "/api/projects?name=Billing%20%26%20Invoices"
        );
        assert_eq!(ApiPath::environment_machines("a/b").as_str(), "/api/environments/a%2Fb/machines");
    }

    #[test]
    fn shapes_match_the_server_routes() {
        assert_eq!(ApiPath::environments_all().shape(), ResponseShape::BareArray);
        assert_eq!(ApiPath::machines_all().shape(), ResponseShape::BareArray);
        assert_eq!(ApiPath::environment_machines("x").shape(), ResponseShape::ItemsEnvelope);
        assert_eq!(ApiPath::projects_named("x").shape(), ResponseShape::ItemsEnvelope);
    }
}
