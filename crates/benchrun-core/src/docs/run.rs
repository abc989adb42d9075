use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const RUN_SCHEMA_VERSION: u32 = 1;

/// Free-form metadata the user attaches to a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

/// Everything identifying a run that is fixed before execution starts.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub benchmark: String,
    pub clients: Vec<String>,
    pub servers: Vec<String>,
    pub user: UserMetadata,
    pub tool_group: String,
    pub sysinfo: String,
    /// Timestamp fragment shared by the run directory name and telemetry.
    pub date: String,
}

/// One run document per parameter-set part. Every part of an invocation
/// carries the same `run_id`; `part` counts up from zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunDocument {
    pub schema_version: u32,
    pub run_id: Uuid,
    pub part: u32,
    pub benchmark: String,
    pub clients: Vec<String>,
    pub servers: Vec<String>,
    pub user_metadata: UserMetadata,
    pub tool_group: String,
    pub sysinfo: String,
    pub date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    /// `<id>-<label>` of the iterations executed in this part.
    pub iterations: Vec<String>,
}

/// Stamps run identity onto per-part documents. The run id is generated
/// once at construction and never changes; parts increment per
/// [`RunAssembler::begin_part`].
pub struct RunAssembler {
    ctx: RunContext,
    run_id: Uuid,
    next_part: u32,
    last: Option<RunDocument>,
}

impl RunAssembler {
    pub fn new(ctx: RunContext) -> Self {
        Self {
            ctx,
            run_id: Uuid::new_v4(),
            next_part: 0,
            last: None,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Opens the next part, stamping identity and the start time.
    pub fn begin_part(&mut self, iterations: Vec<String>) -> RunDocument {
        let doc = RunDocument {
            schema_version: RUN_SCHEMA_VERSION,
            run_id: self.run_id,
            part: self.next_part,
            benchmark: self.ctx.benchmark.clone(),
            clients: self.ctx.clients.clone(),
            servers: self.ctx.servers.clone(),
            user_metadata: self.ctx.user.clone(),
            tool_group: self.ctx.tool_group.clone(),
            sysinfo: self.ctx.sysinfo.clone(),
            date: self.ctx.date.clone(),
            start_time: Utc::now().to_rfc3339(),
            end_time: None,
            iterations,
        };
        self.next_part += 1;
        self.last = Some(doc.clone());
        doc
    }

    /// Closes a part by stamping its end time.
    pub fn finish_part(&mut self, mut doc: RunDocument) -> RunDocument {
        doc.end_time = Some(Utc::now().to_rfc3339());
        self.last = Some(doc.clone());
        doc
    }

    /// The most recently built document. Configuration-document conversion
    /// reuses its metadata rather than regenerating run identity.
    pub fn last(&self) -> Option<&RunDocument> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RunContext {
        RunContext {
            benchmark: "fio".into(),
            clients: vec!["h1".into()],
            servers: vec![],
            user: UserMetadata {
                name: Some("perf".into()),
                ..UserMetadata::default()
            },
            tool_group: "default".into(),
            sysinfo: "default".into(),
            date: "2026.08.24T10.00.00".into(),
        }
    }

    #[test]
    fn run_id_is_stable_across_parts() {
        let mut asm = RunAssembler::new(ctx());
        let a = asm.begin_part(vec!["0-x".into()]);
        let b = asm.begin_part(vec!["1-y".into()]);
        let c = asm.begin_part(vec![]);
        assert_eq!(a.run_id, asm.run_id());
        assert_eq!(a.run_id, b.run_id);
        assert_eq!(b.run_id, c.run_id);
        assert_eq!((a.part, b.part, c.part), (0, 1, 2));
    }

    #[test]
    fn begin_leaves_end_time_open_and_finish_closes_it() {
        let mut asm = RunAssembler::new(ctx());
        let doc = asm.begin_part(vec![]);
        assert!(doc.end_time.is_none());
        assert!(!doc.start_time.is_empty());
        let done = asm.finish_part(doc);
        assert!(done.end_time.is_some());
    }

    #[test]
    fn last_tracks_the_most_recent_document() {
        let mut asm = RunAssembler::new(ctx());
        assert!(asm.last().is_none());
        let doc = asm.begin_part(vec!["0-x".into()]);
        assert_eq!(asm.last().map(|d| d.part), Some(0));
        asm.finish_part(doc);
        assert!(asm.last().and_then(|d| d.end_time.clone()).is_some());
    }

    #[test]
    fn serialized_field_names_are_camel_case() {
        let mut asm = RunAssembler::new(ctx());
        let doc = asm.begin_part(vec!["0-x".into()]);
        let v = serde_json::to_value(&doc).unwrap();
        assert!(v.get("runId").is_some());
        assert!(v.get("startTime").is_some());
        assert!(v.get("schemaVersion").is_some());
        assert_eq!(v["userMetadata"]["name"], "perf");
        assert_eq!(v["part"], 0);
        assert_eq!(v["iterations"][0], "0-x");
    }

    #[test]
    fn documents_round_trip() {
        let mut asm = RunAssembler::new(ctx());
        let doc = asm.begin_part(vec!["0-x".into()]);
        let doc = asm.finish_part(doc);
        let json = serde_json::to_string(&doc).unwrap();
        let back: RunDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
