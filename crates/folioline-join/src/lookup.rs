//! Lookup maps built fresh from snapshots on every run

use folioline_export::{ServicePoint, ServicePointUser};
use rustc_hash::FxHashMap;

/// user id → assigned service point ids
pub type AssignmentMap = FxHashMap<String, Vec<String>>;

/// service point id → name
pub type NameMap = FxHashMap<String, String>;

/// Entries without `userId` are skipped; a later entry for the same user
/// replaces an earlier one.
pub fn user_to_service_points(assignments: &[ServicePointUser]) -> AssignmentMap {
    let mut map = AssignmentMap::default();
    for entry in assignments {
        if let Some(user_id) = entry.user_id.as_deref().filter(|id| !id.is_empty()) {
            map.insert(user_id.to_string(), entry.service_point_ids().to_vec());
        }
    }
    map
}

pub fn service_point_names(points: &[ServicePoint]) -> NameMap {
    points
        .iter()
        .map(|sp| (sp.id.clone(), sp.name.clone().unwrap_or_default()))
        .collect()
}

/// Names for `ids` in order; unknown ids resolve to an empty name.
pub fn resolve_names<'a>(ids: &[String], names: &'a NameMap) -> Vec<&'a str> {
    ids.iter()
        .map(|id| names.get(id).map(String::as_str).unwrap_or(""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(user: Option<&str>, sps: &[&str]) -> ServicePointUser {
        ServicePointUser {
            user_id: user.map(String::from),
            service_points_ids: Some(sps.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    fn point(id: &str, name: Option<&str>) -> ServicePoint {
        ServicePoint {
            id: id.to_string(),
            name: name.map(String::from),
            discovery_display_name: None,
        }
    }

    #[test]
    fn assignments_keyed_by_user() {
        let map = user_to_service_points(&[
            assignment(Some("u1"), &["sp1", "sp2"]),
            assignment(None, &["sp3"]),
            assignment(Some(""), &["sp4"]),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["u1"], vec!["sp1", "sp2"]);
    }

    #[test]
    fn later_assignment_wins() {
        let map = user_to_service_points(&[
            assignment(Some("u1"), &["sp1"]),
            assignment(Some("u1"), &["sp2"]),
        ]);
        assert_eq!(map["u1"], vec!["sp2"]);
    }

    #[test]
    fn missing_name_is_empty() {
        let names = service_point_names(&[point("sp1", Some("Desk A")), point("sp2", None)]);
        assert_eq!(names["sp1"], "Desk A");
        assert_eq!(names["sp2"], "");
    }

    #[test]
    fn unknown_ids_resolve_empty() {
        let names = service_point_names(&[point("sp1", Some("Desk A"))]);
        let ids = vec!["sp1".to_string(), "gone".to_string()];
        assert_eq!(resolve_names(&ids, &names), vec!["Desk A", ""]);
    }
}
