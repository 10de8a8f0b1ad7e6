use super::{PersistenceError, PersistenceResult, ProjectStore};
use crate::contract::ContractTerms;
use crate::project::ProjectInput;
use crate::task::{Dependency, Task};
use crate::weather::WeatherDay;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::sync::{Mutex, MutexGuard};

pub struct SqliteProjectStore {
    connection: Mutex<Connection>,
}

impl SqliteProjectStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS projects (
                name TEXT PRIMARY KEY,
                contract_json TEXT NOT NULL,
                edges_json TEXT NOT NULL,
                weather_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                project TEXT NOT NULL REFERENCES projects(name) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                id TEXT NOT NULL,
                task_json TEXT NOT NULL,
                PRIMARY KEY (project, position),
                UNIQUE (project, id)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::LockPoisoned)
    }

    fn save_header(&self, tx: &Transaction, project: &ProjectInput) -> PersistenceResult<()> {
        let contract = serde_json::to_string(&project.contract)?;
        let edges = serde_json::to_string(&project.edges)?;
        let weather = serde_json::to_string(&project.weather)?;
        tx.execute(
            "INSERT INTO projects (name, contract_json, edges_json, weather_json)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                contract_json = excluded.contract_json,
                edges_json = excluded.edges_json,
                weather_json = excluded.weather_json",
            params![project.name, contract, edges, weather],
        )?;
        Ok(())
    }

    fn save_tasks(&self, tx: &Transaction, project: &ProjectInput) -> PersistenceResult<()> {
        tx.execute("DELETE FROM tasks WHERE project = ?1", params![project.name])?;
        let mut stmt =
            tx.prepare("INSERT INTO tasks (project, position, id, task_json) VALUES (?1, ?2, ?3, ?4)")?;
        for (position, task) in project.tasks.iter().enumerate() {
            let json = serde_json::to_string(task)?;
            stmt.execute(params![project.name, position as i64, task.id, json])?;
        }
        Ok(())
    }
}

impl ProjectStore for SqliteProjectStore {
    fn save_project(&self, project: &ProjectInput) -> PersistenceResult<()> {
        super::validate_project(project)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_header(&tx, project)?;
        self.save_tasks(&tx, project)?;
        tx.commit()?;
        tracing::debug!(name = %project.name, tasks = project.tasks.len(), "project stored");
        Ok(())
    }

    fn load_project(&self, name: &str) -> PersistenceResult<Option<ProjectInput>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT contract_json, edges_json, weather_json FROM projects WHERE name = ?1",
        )?;
        let header: Option<(String, String, String)> = stmt
            .query_row(params![name], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .optional()?;

        let Some((contract_json, edges_json, weather_json)) = header else {
            return Ok(None);
        };

        let contract: ContractTerms = serde_json::from_str(&contract_json)?;
        let edges: Vec<Dependency> = serde_json::from_str(&edges_json)?;
        let weather: Vec<WeatherDay> = serde_json::from_str(&weather_json)?;

        let mut stmt = conn.prepare("SELECT task_json FROM tasks WHERE project = ?1 ORDER BY position ASC")?;
        let rows = stmt.query_map(params![name], |row| row.get::<_, String>(0))?;

        let mut tasks = Vec::new();
        for json in rows {
            let task: Task = serde_json::from_str(&json?)?;
            tasks.push(task);
        }

        let project = ProjectInput {
            name: name.to_string(),
            tasks,
            edges,
            contract,
            weather,
        };
        super::validate_project(&project)?;
        Ok(Some(project))
    }

    fn list_projects(&self) -> PersistenceResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM projects ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn delete_project(&self, name: &str) -> PersistenceResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM projects WHERE name = ?1", params![name])?;
        Ok(removed > 0)
    }
}
