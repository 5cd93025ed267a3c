use chrono::{DateTime, Utc};
use deadpool_sqlite::rusqlite::types::Type;
use deadpool_sqlite::rusqlite::{self, params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::REQUIRED_METADATA_FIELDS;
use crate::errors::RackyardError;
use crate::models::role::{Role, RoleParams};

/// Hardware descriptor attached to every node. Stored as one JSON object;
/// values are opaque to the server, only key presence is checked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct NodeMetadata(Map<String, Value>);

impl NodeMetadata {
    pub fn validate(&self) -> Result<(), RackyardError> {
        for field in REQUIRED_METADATA_FIELDS {
            if !self.0.contains_key(field) {
                return Err(RackyardError::MissingRequiredField(field));
            }
        }

        Ok(())
    }
}

/// Inventory record, unique per (environment_id, name).
#[derive(Serialize, Debug, Clone)]
pub struct Node {
    pub id: i64,

    #[serde(rename = "environmentId")]
    pub environment_id: i64,

    pub name: String,

    pub metadata: NodeMetadata,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Node {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let raw_metadata: String = row.get(3)?;
        let metadata = serde_json::from_str(&raw_metadata)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(Self {
            id: row.get(0)?,
            environment_id: row.get(1)?,
            name: row.get(2)?,
            metadata,
            created_at: parse_timestamp(row, 4)?,
            updated_at: parse_timestamp(row, 5)?,
        })
    }

    pub fn maybe_find_by_environment_id_and_name(
        conn: &Connection,
        environment_id: i64,
        name: &str,
    ) -> Result<Option<Self>, RackyardError> {
        let node = conn
            .query_row(
                "SELECT id, environment_id, name, metadata, created_at, updated_at \
                 FROM nodes WHERE environment_id = ?1 AND name = ?2",
                params![environment_id, name],
                Self::from_row,
            )
            .optional()?;

        Ok(node)
    }

    pub fn find_by_environment_id_and_name(
        conn: &Connection,
        environment_id: i64,
        name: &str,
    ) -> Result<Self, RackyardError> {
        Self::maybe_find_by_environment_id_and_name(conn, environment_id, name)?.ok_or_else(|| {
            RackyardError::NotFound(format!(
                "node '{}' in environment {}",
                name, environment_id
            ))
        })
    }

    pub fn find_by_environment_id(
        conn: &Connection,
        environment_id: i64,
    ) -> Result<Vec<Self>, RackyardError> {
        let mut stmt = conn.prepare(
            "SELECT id, environment_id, name, metadata, created_at, updated_at \
             FROM nodes WHERE environment_id = ?1 ORDER BY name",
        )?;

        let nodes = stmt
            .query_map(params![environment_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nodes)
    }

    /// Inserts the node on first sight of (environment_id, name), otherwise
    /// replaces its metadata in place. Role associations are never touched
    /// from this path.
    pub fn create_or_update(
        conn: &Connection,
        environment_id: i64,
        name: &str,
        metadata: NodeMetadata,
    ) -> Result<Self, RackyardError> {
        match Self::maybe_find_by_environment_id_and_name(conn, environment_id, name)? {
            Some(mut node) => {
                node.update_metadata(conn, metadata)?;
                Ok(node)
            }
            None => Self::insert(conn, environment_id, name, metadata),
        }
    }

    fn insert(
        conn: &Connection,
        environment_id: i64,
        name: &str,
        metadata: NodeMetadata,
    ) -> Result<Self, RackyardError> {
        let now = Utc::now();
        let raw_metadata = serde_json::to_string(&metadata)?;

        conn.execute(
            "INSERT INTO nodes (environment_id, name, metadata, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                environment_id,
                name,
                raw_metadata,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            environment_id,
            name: name.to_string(),
            metadata,
            created_at: now,
            updated_at: now,
        })
    }

    fn update_metadata(
        &mut self,
        conn: &Connection,
        metadata: NodeMetadata,
    ) -> Result<(), RackyardError> {
        let now = Utc::now();
        let raw_metadata = serde_json::to_string(&metadata)?;

        conn.execute(
            "UPDATE nodes SET metadata = ?1, updated_at = ?2 WHERE id = ?3",
            params![raw_metadata, now.to_rfc3339(), self.id],
        )?;

        self.metadata = metadata;
        self.updated_at = now;

        Ok(())
    }

    pub fn roles(&self, conn: &Connection) -> Result<Vec<Role>, RackyardError> {
        Role::find_by_node_id(conn, self.id)
    }

    /// Inserts one new role row per descriptor and associates each with the
    /// node after its existing associations, keeping input order.
    pub fn append_roles(
        &self,
        conn: &Connection,
        role_params: &[RoleParams],
    ) -> Result<(), RackyardError> {
        let tx = conn.unchecked_transaction()?;

        let mut position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM node_roles WHERE node_id = ?1",
            params![self.id],
            |row| row.get(0),
        )?;

        for role_param in role_params {
            let role = Role::insert(&tx, &role_param.name)?;

            tx.execute(
                "INSERT INTO node_roles (node_id, role_id, position) VALUES (?1, ?2, ?3)",
                params![self.id, role.id, position],
            )?;

            position += 1;
        }

        tx.commit()?;

        Ok(())
    }
}

fn parse_timestamp(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(idx)?;

    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory sqlite");
        conn.execute_batch(crate::db::SCHEMA).expect("schema");

        conn
    }

    fn metadata(value: Value) -> NodeMetadata {
        serde_json::from_value(value).expect("metadata object")
    }

    fn full_metadata() -> Value {
        json!({
            "block_device": "sda",
            "interfaces": "eth0",
            "cpu": "2",
            "memory": "4096"
        })
    }

    fn role_params(names: &[&str]) -> Vec<RoleParams> {
        names
            .iter()
            .map(|name| RoleParams {
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn validate_accepts_complete_metadata() {
        assert!(metadata(full_metadata()).validate().is_ok());
    }

    #[test]
    fn validate_rejects_each_missing_field() {
        for field in REQUIRED_METADATA_FIELDS {
            let mut value = full_metadata();
            value.as_object_mut().unwrap().remove(field);

            let err = metadata(value).validate().unwrap_err();
            assert!(matches!(err, RackyardError::MissingRequiredField(f) if f == field));
        }
    }

    #[test]
    fn create_or_update_keeps_one_row_per_name() {
        let conn = setup_conn();

        let created = Node::create_or_update(&conn, 1, "a.example.com", metadata(full_metadata()))
            .expect("create");

        let mut replacement = full_metadata();
        replacement["memory"] = json!("8192");
        let updated = Node::create_or_update(&conn, 1, "a.example.com", metadata(replacement))
            .expect("update");

        assert_eq!(created.id, updated.id);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);

        let found = Node::find_by_environment_id_and_name(&conn, 1, "a.example.com").expect("find");
        assert_eq!(found.metadata, updated.metadata);
    }

    #[test]
    fn same_name_in_another_environment_is_a_separate_node() {
        let conn = setup_conn();

        let first = Node::create_or_update(&conn, 1, "a.example.com", metadata(full_metadata()))
            .expect("env 1");
        let second = Node::create_or_update(&conn, 2, "a.example.com", metadata(full_metadata()))
            .expect("env 2");

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn append_roles_preserves_existing_order() {
        let conn = setup_conn();
        let node = Node::create_or_update(&conn, 1, "a.example.com", metadata(full_metadata()))
            .expect("create");

        node.append_roles(&conn, &role_params(&["myrole"])).expect("first append");
        node.append_roles(&conn, &role_params(&["role1", "role2"]))
            .expect("second append");

        let names: Vec<String> = node
            .roles(&conn)
            .expect("roles")
            .into_iter()
            .map(|role| role.name)
            .collect();
        assert_eq!(names, ["myrole", "role1", "role2"]);
    }

    #[test]
    fn update_metadata_leaves_roles_untouched() {
        let conn = setup_conn();
        let node = Node::create_or_update(&conn, 1, "a.example.com", metadata(full_metadata()))
            .expect("create");
        node.append_roles(&conn, &role_params(&["myrole"])).expect("append");

        let mut replacement = full_metadata();
        replacement["cpu"] = json!("16");
        let node = Node::create_or_update(&conn, 1, "a.example.com", metadata(replacement))
            .expect("update");

        let names: Vec<String> = node
            .roles(&conn)
            .expect("roles")
            .into_iter()
            .map(|role| role.name)
            .collect();
        assert_eq!(names, ["myrole"]);
    }
}
