//! Shared fixtures: a temporary store layout and a scripted stand-in for the
//! external scraper and parser.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use grocer_pipeline::{
    CommandOutput, CommandRunner, ExternalTools, Invocation, PipelineConfig, PipelineError,
    QueryService, SettlePolicy,
};
use grocer_store::{parsed_artifact_name, FsArtifactStore};
use serde_json::Value;
use tempfile::TempDir;

pub const PARSER: &str = "unified-html-parser.js";
pub const SCRAPER: &str = "location-selector-orchestrator.js";

type Handler = Box<dyn Fn(&Invocation) -> std::io::Result<CommandOutput> + Send + Sync>;

/// Runs a closure in place of a real process and records every invocation.
pub struct ScriptedRunner {
    handler: Handler,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new(
        handler: impl Fn(&Invocation) -> std::io::Result<CommandOutput> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// A runner whose processes always exit 0 without writing anything.
    pub fn noop() -> Arc<Self> {
        Self::new(|_| Ok(exited(0)))
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, PipelineError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(invocation.clone());
        (self.handler)(invocation).map_err(|source| PipelineError::Spawn {
            program: invocation.program.clone(),
            source,
        })
    }
}

pub fn exited(code: i32) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        success: code == 0,
        ..CommandOutput::default()
    }
}

pub fn failed_with(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        stderr: stderr.to_string(),
        ..exited(code)
    }
}

pub fn is_scrape(invocation: &Invocation) -> bool {
    invocation.args.first().is_some_and(|a| a == SCRAPER)
}

pub fn is_parse(invocation: &Invocation) -> bool {
    invocation.args.first().is_some_and(|a| a == PARSER)
}

/// Target passed to the parser (file or directory).
pub fn parse_target(invocation: &Invocation) -> PathBuf {
    PathBuf::from(&invocation.args[1])
}

/// Writes the per-file artifact the real parser would produce for `source`.
pub fn write_artifact_for(artifacts: &Path, source: &Path, body: &Value) {
    let name = parsed_artifact_name(source).expect("artifact name");
    write_json(artifacts, &name, body);
}

pub fn write_json(dir: &Path, name: &str, body: &Value) {
    std::fs::create_dir_all(dir).expect("create dir");
    std::fs::write(dir.join(name), body.to_string()).expect("write artifact");
}

/// Pushes a file's modification time into the past.
pub fn age(path: &Path, by: Duration) {
    let file = std::fs::File::options()
        .write(true)
        .open(path)
        .expect("open for mtime");
    file.set_modified(SystemTime::now() - by).expect("set mtime");
}

pub fn record(site: &str, location: &str, names: &[&str]) -> Value {
    serde_json::json!({
        "site": site,
        "location": location,
        "products": names.iter().map(|n| serde_json::json!({ "name": n, "price": 10.0 })).collect::<Vec<_>>(),
        "totalProducts": names.len(),
        "filename": format!("{site}.html"),
    })
}

/// Temporary artifact, HTML and tools directories.
pub struct Fixture {
    _tmp: TempDir,
    pub artifacts: PathBuf,
    pub html: PathBuf,
    pub tools: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let artifacts = tmp.path().join("outputs");
        let html = tmp.path().join("output");
        let tools = tmp.path().join("tools");
        std::fs::create_dir_all(&artifacts).expect("artifacts dir");
        std::fs::create_dir_all(&tools).expect("tools dir");
        Self {
            _tmp: tmp,
            artifacts,
            html,
            tools,
        }
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            artifacts_dir: self.artifacts.clone(),
            html_dir: self.html.clone(),
            upload_dir: self.artifacts.clone(),
            tools: ExternalTools {
                program: "node".to_string(),
                workdir: self.tools.clone(),
                parser_script: PathBuf::from(PARSER),
                scraper_script: PathBuf::from(SCRAPER),
                timeout: None,
            },
            settle: SettlePolicy::new(Duration::ZERO, 3),
        }
    }

    pub fn service(&self, runner: Arc<ScriptedRunner>) -> QueryService {
        QueryService::new(
            self.config(),
            Arc::new(FsArtifactStore::new(&self.artifacts)),
            runner,
        )
    }

    pub fn write_artifact(&self, name: &str, body: &Value) {
        write_json(&self.artifacts, name, body);
    }

    pub fn write_html(&self, name: &str) -> PathBuf {
        std::fs::create_dir_all(&self.html).expect("html dir");
        let path = self.html.join(name);
        std::fs::write(&path, "<html><body></body></html>").expect("write html");
        path
    }
}
