//! Exported entity kinds and their column tables

use folioline_core::PageRequest;

/// One TSV column: output name and dotted source path in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub path: &'static str,
}

/// Column named after its source path
const fn col(path: &'static str) -> Column {
    Column { name: path, path }
}

const USER_COLUMNS: &[Column] = &[
    col("id"),
    col("username"),
    col("barcode"),
    col("active"),
    col("patronGroup"),
    col("createdDate"),
    col("updatedDate"),
    col("personal.lastName"),
    col("personal.firstName"),
    col("personal.middleName"),
    col("personal.email"),
    col("personal.mobilePhone"),
    col("personal.preferredContactTypeId"),
    col("metadata.createdDate"),
    col("metadata.updatedDate"),
    col("metadata.createdByUserId"),
    col("metadata.updatedByUserId"),
];

const SERVICE_POINT_COLUMNS: &[Column] = &[
    col("id"),
    col("name"),
    col("code"),
    col("discoveryDisplayName"),
    col("description"),
    col("shelvingLagTime"),
    col("pickupLocation"),
    col("holdShelfExpiryPeriod"),
    col("staffSlips"),
    col("metadata.createdDate"),
    col("metadata.updatedDate"),
    col("metadata.createdByUserId"),
    col("metadata.updatedByUserId"),
];

const SERVICE_POINT_USER_COLUMNS: &[Column] = &[
    col("id"),
    col("userId"),
    col("servicePointsIds"),
    col("defaultServicePointId"),
];

const PATRON_GROUP_COLUMNS: &[Column] = &[
    col("id"),
    col("group"),
    col("desc"),
    col("expirationOffsetInDays"),
    col("metadata.createdDate"),
    col("metadata.updatedDate"),
];

/// Record kinds pulled from the gateway
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Users,
    ServicePoints,
    ServicePointUsers,
    PatronGroups,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Self::Users,
        Self::ServicePoints,
        Self::ServicePointUsers,
        Self::PatronGroups,
    ];

    /// Parse CLI/config string into enum
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "users" => Some(Self::Users),
            "service-points" => Some(Self::ServicePoints),
            "service-point-users" => Some(Self::ServicePointUsers),
            "patron-groups" => Some(Self::PatronGroups),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::ServicePoints => "service-points",
            Self::ServicePointUsers => "service-point-users",
            Self::PatronGroups => "patron-groups",
        }
    }

    /// Collection endpoint
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::ServicePoints => "service-points",
            Self::ServicePointUsers => "service-points-users",
            Self::PatronGroups => "groups",
        }
    }

    /// Response field holding the records of one page
    pub fn array_field(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::ServicePoints => "servicepoints",
            Self::ServicePointUsers => "servicePointsUsers",
            Self::PatronGroups => "usergroups",
        }
    }

    /// Fixed TSV schema
    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::Users => USER_COLUMNS,
            Self::ServicePoints => SERVICE_POINT_COLUMNS,
            Self::ServicePointUsers => SERVICE_POINT_USER_COLUMNS,
            Self::PatronGroups => PATRON_GROUP_COLUMNS,
        }
    }

    /// Columns of the id-only export
    pub fn id_columns(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["id"],
            Self::ServicePoints => &["id", "discoveryDisplayName"],
            Self::ServicePointUsers => &["id", "userId"],
            Self::PatronGroups => &["id", "group"],
        }
    }

    /// Output filename stem
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::ServicePoints => "service_points",
            Self::ServicePointUsers => "service_point_users",
            Self::PatronGroups => "patron_groups",
        }
    }

    /// Filename of the id-only export
    pub fn ids_file(self) -> &'static str {
        match self {
            Self::Users => "user_ids.tsv",
            Self::ServicePoints => "service_point_ids.tsv",
            Self::ServicePointUsers => "service_point_user_ids.tsv",
            Self::PatronGroups => "patron_group_ids.tsv",
        }
    }

    pub fn page_request(self) -> PageRequest {
        PageRequest::new(self.endpoint(), self.array_field())
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_roundtrip() {
        for entity in Entity::ALL {
            assert_eq!(Entity::from_name(entity.name()), Some(entity));
        }
        assert_eq!(Entity::from_name("Users"), None);
        assert_eq!(Entity::from_name(""), None);
    }

    #[test]
    fn id_columns_are_part_of_schema() {
        for entity in Entity::ALL {
            let names: Vec<&str> = entity.columns().iter().map(|c| c.name).collect();
            for id in entity.id_columns() {
                assert!(names.contains(id), "{entity}: {id} not in columns");
            }
            assert_eq!(names[0], "id");
        }
    }

    #[test]
    fn assignment_endpoint_differs_from_name() {
        // gateway path is plural "service-points-users"
        assert_eq!(Entity::ServicePointUsers.endpoint(), "service-points-users");
        assert_eq!(Entity::ServicePointUsers.array_field(), "servicePointsUsers");
    }

    #[test]
    fn page_request_uses_entity_paths() {
        let req = Entity::PatronGroups.page_request();
        assert_eq!(req.path, "groups");
        assert_eq!(req.array_field, "usergroups");
    }
}
