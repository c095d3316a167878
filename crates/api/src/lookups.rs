//! Lookup operations over environments, machines and projects.
//!
//! Each lookup resolves credentials and endpoint from the settings it is
//! given, issues exactly one GET, then filters the list client-side. Server
//! order is preserved. When `only_enabled` is set, disabled machines are
//! dropped on top of the lookup's own filter.

use octo_types::{Environment, Machine, Project};
use tracing::{debug, info};

use crate::client::OctoClient;
use crate::error::OctoResult;
use crate::paths::ApiPath;
use crate::settings::ConnectionSettings;

/// Which machines a lookup keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineFilter<'a> {
    Any,
    Role(&'a str),
    RoleInEnvironment { role: &'a str, environment_id: &'a str },
    Thumbprint(&'a str),
    TentacleName(&'a str),
}

impl MachineFilter<'_> {
    pub fn matches(&self, machine: &Machine) -> bool {
        match *self {
            MachineFilter::Any => true,
            MachineFilter::Role(role) => machine.has_role(role),
            MachineFilter::RoleInEnvironment { role, environment_id } => {
                machine.has_role(role) && machine.in_environment(environment_id)
            }
            MachineFilter::Thumbprint(thumbprint) => machine.thumbprint_matches(thumbprint),
            MachineFilter::TentacleName(name) => machine.address_mentions(name),
        }
    }
}

/// Apply `filter`, and the enabled-only switch, keeping input order.
pub fn select_machines(machines: Vec<Machine>, filter: MachineFilter<'_>, only_enabled: bool) -> Vec<Machine> {
    machines
        .into_iter()
        .filter(|machine| filter.matches(machine))
        .filter(|machine| !only_enabled || !machine.is_disabled)
        .collect()
}

fn names(machines: Vec<Machine>) -> Vec<String> {
    machines.into_iter().map(|machine| machine.name).collect()
}

/// Every environment as an `{id, name}` pair.
pub async fn list_environments(settings: &ConnectionSettings) -> OctoResult<Vec<Environment>> {
    let client = OctoClient::connect(settings)?;
    client.get_list(&ApiPath::environments_all()).await
}

/// Names of the machines in one environment.
pub async fn machines_in_environment(
    settings: &ConnectionSettings,
    environment_id: &str,
    only_enabled: bool,
) -> OctoResult<Vec<String>> {
    let client = OctoClient::connect(settings)?;
    let machines = client.get_list(&ApiPath::environment_machines(environment_id)).await?;
    Ok(names(select_machines(machines, MachineFilter::Any, only_enabled)))
}

/// Names of the machines carrying `role`.
pub async fn machines_in_role(settings: &ConnectionSettings, role: &str, only_enabled: bool) -> OctoResult<Vec<String>> {
    let client = OctoClient::connect(settings)?;
    let machines = client.get_list(&ApiPath::machines_all()).await?;
    let selected = select_machines(machines, MachineFilter::Role(role), only_enabled);
    debug!(role, count = selected.len(), "machines in role");
    Ok(names(selected))
}

/// Names of the machines carrying `role` that are also in `environment_id`.
pub async fn machines_in_role_and_environment(
    settings: &ConnectionSettings,
    role: &str,
    environment_id: &str,
    only_enabled: bool,
) -> OctoResult<Vec<String>> {
    let client = OctoClient::connect(settings)?;
    let machines = client.get_list(&ApiPath::machines_all()).await?;
    let filter = MachineFilter::RoleInEnvironment { role, environment_id };
    Ok(names(select_machines(machines, filter, only_enabled)))
}

/// Full records of the machines whose thumbprint equals `thumbprint`.
///
/// The comparison is exact (ignoring ASCII case) whether or not
/// `only_enabled` is set.
pub async fn machines_by_thumbprint(
    settings: &ConnectionSettings,
    thumbprint: &str,
    only_enabled: bool,
) -> OctoResult<Vec<Machine>> {
    let client = OctoClient::connect(settings)?;
    let machines = client.get_list(&ApiPath::machines_all()).await?;
    Ok(select_machines(machines, MachineFilter::Thumbprint(thumbprint), only_enabled))
}

/// Names of the machines whose address contains `<name>.`.
pub async fn machines_by_tentacle_name(
    settings: &ConnectionSettings,
    name: &str,
    only_enabled: bool,
) -> OctoResult<Vec<String>> {
    let client = OctoClient::connect(settings)?;
    let machines = client.get_list(&ApiPath::machines_all()).await?;
    Ok(names(select_machines(machines, MachineFilter::TentacleName(name), only_enabled)))
}

/// Projects matching `name`.
///
/// `Ok(None)` means the server found nothing; that is logged as a notice, not
/// an error. Otherwise every match is returned; uniqueness is not assumed.
pub async fn project_by_name(settings: &ConnectionSettings, name: &str) -> OctoResult<Option<Vec<Project>>> {
    let client = OctoClient::connect(settings)?;
    let projects: Vec<Project> = client.get_list(&ApiPath::projects_named(name)).await?;
    if projects.is_empty() {
        info!(project = name, "no results");
        return Ok(None);
    }
    Ok(Some(projects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn machine(name: &str, roles: &[&str], environments: &[&str], thumbprint: &str, uri: &str, disabled: bool) -> Machine {
        serde_json::from_value(json!({
            "Name": name,
            "Roles": roles,
            "EnvironmentIds": environments,
            "Thumbprint": thumbprint,
            "Uri": uri,
            "IsDisabled": disabled,
        }))
        .unwrap()
    }

    fn fleet() -> Vec<Machine> {
        vec![
            machine("web01", &["web"], &["Environments-1"], "AAA", "https://web01.corp:10933/", false),
            machine("web02", &["web"], &["Environments-2"], "BBB", "https://web02.corp:10933/", true),
            machine("metrics", &["telegraf", "web"], &["Environments-1"], "CCC", "https://metrics.corp:10933/", false),
        ]
    }

    fn selected_names(filter: MachineFilter<'_>, only_enabled: bool) -> Vec<String> {
        names(select_machines(fleet(), filter, only_enabled))
    }

    #[test]
    fn role_filter_keeps_server_order() {
        assert_eq!(selected_names(MachineFilter::Role("web"), false), vec!["web01", "web02", "metrics"]);
        assert_eq!(selected_names(MachineFilter::Role("telegraf"), false), vec!["metrics"]);
    }

    #[test]
    fn enabled_only_composes_with_the_primary_filter() {
        assert_eq!(selected_names(MachineFilter::Role("web"), true), vec!["web01", "metrics"]);
        assert_eq!(selected_names(MachineFilter::Any, true), vec!["web01", "metrics"]);
        assert!(selected_names(MachineFilter::Role("db"), true).is_empty());
    }

    #[test]
    fn role_and_environment_requires_both() {
        let filter = MachineFilter::RoleInEnvironment {
            role: "web",
            environment_id: "Environments-2",
        };
        assert_eq!(selected_names(filter, false), vec!["web02"]);
        assert!(selected_names(filter, true).is_empty());
    }

    #[test]
    fn thumbprint_match_is_the_same_on_both_paths() {
        assert_eq!(selected_names(MachineFilter::Thumbprint("bbb"), false), vec!["web02"]);
        assert!(selected_names(MachineFilter::Thumbprint("bbb"), true).is_empty());
        assert!(selected_names(MachineFilter::Thumbprint("BB"), false).is_empty());
    }

    #[test]
    fn tentacle_name_matches_host_label() {
        assert_eq!(selected_names(MachineFilter::TentacleName("web0"), false), Vec::<String>::new());
        assert_eq!(selected_names(MachineFilter::TentacleName("web02"), false), vec!["web02"]);
        assert_eq!(selected_names(MachineFilter::TentacleName("eb0"), false), Vec::<String>::new());
        assert_eq!(selected_names(MachineFilter::TentacleName("metrics"), true), vec!["metrics"]);
    }

    #[test]
    fn every_enabled_only_result_is_enabled() {
        let filters = [
            MachineFilter::Role("web"),
            MachineFilter::RoleInEnvironment {
                role: "web",
                environment_id: "Environments-1",
            },
            MachineFilter::Thumbprint("BBB"),
            MachineFilter::TentacleName("web02"),
        ];
        for filter in filters {
            assert!(select_machines(fleet(), filter, true).iter().all(|machine| !machine.is_disabled));
        }
    }
}
