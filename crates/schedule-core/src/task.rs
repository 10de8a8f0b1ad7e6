use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type TaskId = String;

/// A name that does not match any variant of a string-keyed enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseNameError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseNameError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Work category. Only the weather simulator looks at it, to decide which
/// scoped weather records apply to a scenario.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE"), try_from = "String")]
pub enum WorkType {
    Earthwork,
    Concrete,
    Crane,
    Steel,
    Electrical,
    Plumbing,
    Finishing,
    #[default]
    General,
}

impl WorkType {
    pub const ALL: [WorkType; 8] = [
        WorkType::Earthwork,
        WorkType::Concrete,
        WorkType::Crane,
        WorkType::Steel,
        WorkType::Electrical,
        WorkType::Plumbing,
        WorkType::Finishing,
        WorkType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Earthwork => "EARTHWORK",
            WorkType::Concrete => "CONCRETE",
            WorkType::Crane => "CRANE",
            WorkType::Steel => "STEEL",
            WorkType::Electrical => "ELECTRICAL",
            WorkType::Plumbing => "PLUMBING",
            WorkType::Finishing => "FINISHING",
            WorkType::General => "GENERAL",
        }
    }
}

/// Case-insensitive, surrounding whitespace ignored.
impl FromStr for WorkType {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|wt| wt.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseNameError::new("work type", value))
    }
}

impl TryFrom<String> for WorkType {
    type Error = ParseNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precedence relation between a predecessor and its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Relation {
    /// Finish-to-start
    #[default]
    FS,
    /// Start-to-start
    SS,
    /// Finish-to-finish
    FF,
    /// Start-to-finish
    SF,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::FS => "FS",
            Relation::SS => "SS",
            Relation::FF => "FF",
            Relation::SF => "SF",
        }
    }

    /// Lower bound on the successor's early start imposed by this edge.
    ///
    /// Returns `None` on overflow.
    pub fn earliest_start_bound(
        &self,
        lag: i64,
        pred_es: i64,
        pred_ef: i64,
        duration: i64,
    ) -> Option<i64> {
        match self {
            Relation::FS => pred_ef.checked_add(lag),
            Relation::SS => pred_es.checked_add(lag),
            Relation::FF => pred_ef.checked_add(lag)?.checked_sub(duration),
            Relation::SF => pred_es.checked_add(lag)?.checked_sub(duration),
        }
    }

    /// Upper bound on the predecessor's late finish imposed by this edge.
    /// `duration` is the predecessor's own duration.
    ///
    /// Returns `None` on overflow.
    pub fn latest_finish_bound(
        &self,
        lag: i64,
        succ_ls: i64,
        succ_lf: i64,
        duration: i64,
    ) -> Option<i64> {
        match self {
            Relation::FS => succ_ls.checked_sub(lag),
            Relation::SS => succ_ls.checked_sub(lag)?.checked_add(duration),
            Relation::FF => succ_lf.checked_sub(lag),
            Relation::SF => succ_lf.checked_sub(lag)?.checked_add(duration),
        }
    }
}

impl FromStr for Relation {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FS" => Ok(Relation::FS),
            "SS" => Ok(Relation::SS),
            "FF" => Ok(Relation::FF),
            "SF" => Ok(Relation::SF),
            _ => Err(ParseNameError::new("relation", value)),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predecessor {
    pub id: TaskId,
    #[serde(rename = "type", default)]
    pub relation: Relation,
    #[serde(default)]
    pub lag: i64,
}

impl Predecessor {
    pub fn new(id: impl Into<TaskId>, relation: Relation, lag: i64) -> Self {
        Self {
            id: id.into(),
            relation,
            lag,
        }
    }

    pub fn finish_to_start(id: impl Into<TaskId>) -> Self {
        Self::new(id, Relation::FS, 0)
    }

    /// Compact form used in CSV cells and the CLI, e.g. `A:FS+2`.
    pub fn to_compact(&self) -> String {
        if self.lag == 0 {
            format!("{}:{}", self.id, self.relation)
        } else {
            format!("{}:{}{:+}", self.id, self.relation, self.lag)
        }
    }

    /// Parse `A`, `A:SS`, `A:FF-2` or `A:FS+3`.
    pub fn parse_compact(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let Some((id, rest)) = text.split_once(':') else {
            return Some(Self::finish_to_start(text));
        };
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        let rest = rest.trim();
        let (rel, lag) = match rest.find(['+', '-']) {
            Some(pos) => (&rest[..pos], rest[pos..].parse::<i64>().ok()?),
            None => (rest, 0),
        };
        let relation = rel.parse::<Relation>().ok()?;
        Some(Self::new(id, relation, lag))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Working days.
    pub duration: i64,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub predecessors: Vec<Predecessor>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>, duration: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration,
            work_type: WorkType::General,
            predecessors: Vec::new(),
        }
    }

    pub fn with_work_type(mut self, work_type: WorkType) -> Self {
        self.work_type = work_type;
        self
    }

    pub fn with_predecessor(mut self, predecessor: Predecessor) -> Self {
        self.predecessors.push(predecessor);
        self
    }

    /// Shorthand for a zero-lag finish-to-start predecessor.
    pub fn after(self, id: impl Into<TaskId>) -> Self {
        self.with_predecessor(Predecessor::finish_to_start(id))
    }
}

/// An explicit edge supplied alongside the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub from: TaskId,
    pub to: TaskId,
    #[serde(rename = "type", default)]
    pub relation: Relation,
    #[serde(default)]
    pub lag: i64,
}

impl Dependency {
    pub fn new(from: impl Into<TaskId>, to: impl Into<TaskId>, relation: Relation, lag: i64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation,
            lag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_bounds_follow_relation_kind() {
        // pred ES=2 EF=7, successor duration 3
        assert_eq!(Relation::FS.earliest_start_bound(1, 2, 7, 3), Some(8));
        assert_eq!(Relation::SS.earliest_start_bound(1, 2, 7, 3), Some(3));
        assert_eq!(Relation::FF.earliest_start_bound(1, 2, 7, 3), Some(5));
        assert_eq!(Relation::SF.earliest_start_bound(1, 2, 7, 3), Some(0));
    }

    #[test]
    fn backward_bounds_mirror_forward_bounds() {
        // succ LS=10 LF=13, predecessor duration 4
        assert_eq!(Relation::FS.latest_finish_bound(1, 10, 13, 4), Some(9));
        assert_eq!(Relation::SS.latest_finish_bound(1, 10, 13, 4), Some(13));
        assert_eq!(Relation::FF.latest_finish_bound(1, 10, 13, 4), Some(12));
        assert_eq!(Relation::SF.latest_finish_bound(1, 10, 13, 4), Some(16));
    }

    #[test]
    fn bounds_report_overflow() {
        assert_eq!(Relation::FS.earliest_start_bound(i64::MAX, 0, 1, 1), None);
        assert_eq!(Relation::FF.latest_finish_bound(i64::MIN, 0, 1, 1), None);
    }

    #[test]
    fn compact_predecessor_parsing() {
        assert_eq!(
            Predecessor::parse_compact("A"),
            Some(Predecessor::finish_to_start("A"))
        );
        assert_eq!(
            Predecessor::parse_compact(" B:ss-2 "),
            Some(Predecessor::new("B", Relation::SS, -2))
        );
        assert_eq!(
            Predecessor::parse_compact("C:FF+3"),
            Some(Predecessor::new("C", Relation::FF, 3))
        );
        assert_eq!(Predecessor::parse_compact("C:XX"), None);
        assert_eq!(Predecessor::parse_compact(":FS"), None);
        assert_eq!(Predecessor::new("D", Relation::SF, -1).to_compact(), "D:SF-1");
        assert_eq!(Predecessor::new("D", Relation::FS, 0).to_compact(), "D:FS");
    }

    #[test]
    fn predecessor_deserializes_with_defaults() {
        let pred: Predecessor = serde_json::from_str(r#"{"id":"A"}"#).unwrap();
        assert_eq!(pred, Predecessor::finish_to_start("A"));
        let pred: Predecessor = serde_json::from_str(r#"{"id":"A","type":"SS","lag":-1}"#).unwrap();
        assert_eq!(pred.relation, Relation::SS);
        assert_eq!(pred.lag, -1);
    }

    #[test]
    fn work_type_parses_case_insensitively() {
        assert_eq!("concrete".parse::<WorkType>(), Ok(WorkType::Concrete));
        assert_eq!(" CRANE ".parse::<WorkType>(), Ok(WorkType::Crane));
        assert_eq!(
            "paint".parse::<WorkType>(),
            Err(ParseNameError::new("work type", "paint"))
        );
        let json = serde_json::to_string(&WorkType::Earthwork).unwrap();
        assert_eq!(json, "\"EARTHWORK\"");
    }

    #[test]
    fn work_type_deserializes_in_any_case() {
        let parsed: Vec<WorkType> = serde_json::from_str(r#"["concrete","Crane","EARTHWORK"]"#).unwrap();
        assert_eq!(parsed, [WorkType::Concrete, WorkType::Crane, WorkType::Earthwork]);
        let err = serde_json::from_str::<WorkType>(r#""paint""#).unwrap_err();
        assert!(err.to_string().contains("unknown work type 'paint'"));

        let task: Task = serde_json::from_str(r#"{"id":"A","name":"a","duration":1,"work_type":"steel"}"#).unwrap();
        assert_eq!(task.work_type, WorkType::Steel);
    }

    #[test]
    fn relation_parses_case_insensitively() {
        assert_eq!(" ss ".parse::<Relation>(), Ok(Relation::SS));
        assert!("XX".parse::<Relation>().is_err());
    }
}
