use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use log::info;
use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, ReadableTableMetadata};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::time::Instant;

use crate::database::schema::grant::TARGET_GRANT_TABLE;
use crate::database::schema::target::{TARGET_TABLE, TargetSchema};
use crate::database::schema::target_list::{TARGET_LIST_TABLE, TargetListSchema};
use crate::database::schema::user::{USER_TABLE, UserSchema};
use crate::models::target::{NewTarget, Target};
use crate::models::target_list::TargetList;
use crate::models::user::{User, hash_password};

/// Record store for targets, users, object grants and target lists.
///
/// Request handlers only ever open read transactions; writes happen at
/// start-up (seeding) and from tests.
#[derive(Debug)]
pub struct TargetStore {
    db: Database,
}

impl TargetStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let db = Database::create(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::initialize(db)
    }

    pub fn in_memory() -> Result<Self> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .context("Failed to create in-memory database")?;
        Self::initialize(db)
    }

    fn initialize(db: Database) -> Result<Self> {
        info!("Initializing database tables...");
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(TARGET_TABLE)?;
            let _ = txn.open_table(USER_TABLE)?;
            let _ = txn.open_table(TARGET_GRANT_TABLE)?;
            let _ = txn.open_table(TARGET_LIST_TABLE)?;
        }
        txn.commit()?;
        Ok(Self { db })
    }

    // ────────────────────────────────────────────────────────────────
    // Writes
    // ────────────────────────────────────────────────────────────────

    pub fn insert_target(&self, target: NewTarget) -> Result<u64> {
        let txn = self.db.begin_write()?;
        let id = {
            let mut table = txn.open_table(TARGET_TABLE)?;
            let id = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 1,
            };
            let schema = target.into_schema(id, Utc::now());
            table.insert(id, bitcode::encode(&schema).as_slice())?;
            id
        };
        txn.commit()?;
        Ok(id)
    }

    pub fn upsert_user(
        &self,
        username: &str,
        password: &str,
        is_superuser: bool,
        permissions: &[&str],
        groups: &[&str],
    ) -> Result<()> {
        let schema = UserSchema {
            username: username.to_string(),
            password_hash: hash_password(password),
            is_superuser,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        };
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(USER_TABLE)?;
            table.insert(username, bitcode::encode(&schema).as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Allow `principal` (`user:<name>` or `group:<name>`) to view a target.
    pub fn grant(&self, principal: &str, target_id: u64) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let targets = txn.open_table(TARGET_TABLE)?;
            if targets.get(target_id)?.is_none() {
                return Err(anyhow!("Target {} not found", target_id));
            }
            let mut table = txn.open_table(TARGET_GRANT_TABLE)?;
            table.insert((principal, target_id), ())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn create_target_list(&self, name: &str, targets: &[u64]) -> Result<u64> {
        let txn = self.db.begin_write()?;
        let id = {
            let mut table = txn.open_table(TARGET_LIST_TABLE)?;
            let id = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 1,
            };
            let schema = TargetListSchema {
                id,
                name: name.to_string(),
                created_ms: Utc::now().timestamp_millis(),
                targets: targets.to_vec(),
            };
            table.insert(id, bitcode::encode(&schema).as_slice())?;
            id
        };
        txn.commit()?;
        Ok(id)
    }

    // ────────────────────────────────────────────────────────────────
    // Reads
    // ────────────────────────────────────────────────────────────────

    /// All targets in insertion (id) order.
    pub fn read_targets(&self) -> Result<Vec<Target>> {
        let start_time = Instant::now();
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TARGET_TABLE)?;
        let mut targets = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let schema: TargetSchema =
                bitcode::decode(value.value()).context("Failed to decode target")?;
            targets.push(Target::from(schema));
        }
        info!(duration = &*format!("{:?}", start_time.elapsed()); "Read {} targets", targets.len());
        Ok(targets)
    }

    pub fn read_user_schema(&self, username: &str) -> Result<Option<UserSchema>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(USER_TABLE)?;
        match table.get(username)? {
            Some(value) => Ok(Some(
                bitcode::decode(value.value()).context("Failed to decode user")?,
            )),
            None => Ok(None),
        }
    }

    pub fn read_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.read_user_schema(username)?.map(User::from))
    }

    /// Target ids granted to any of the given principals.
    pub fn granted_target_ids(&self, principals: &[String]) -> Result<HashSet<u64>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TARGET_GRANT_TABLE)?;
        let mut ids = HashSet::new();
        for principal in principals {
            let principal = principal.as_str();
            for entry in table.range((principal, 0u64)..=(principal, u64::MAX))? {
                let (key, _) = entry?;
                ids.insert(key.value().1);
            }
        }
        Ok(ids)
    }

    pub fn read_target_lists(&self) -> Result<Vec<TargetList>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TARGET_LIST_TABLE)?;
        let mut lists = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let schema: TargetListSchema =
                bitcode::decode(value.value()).context("Failed to decode target list")?;
            lists.push(TargetList::from(schema));
        }
        Ok(lists)
    }

    pub fn read_target_list_members(&self, list_id: u64) -> Result<Option<BTreeSet<u64>>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TARGET_LIST_TABLE)?;
        match table.get(list_id)? {
            Some(value) => {
                let schema: TargetListSchema =
                    bitcode::decode(value.value()).context("Failed to decode target list")?;
                Ok(Some(schema.targets.into_iter().collect()))
            }
            None => Ok(None),
        }
    }

    pub fn count_targets(&self) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TARGET_TABLE)?;
        Ok(table.len()?)
    }
}
