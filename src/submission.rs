// Outbound delivery of a finished session. Sinks never report failure back:
// HttpSink posts in a detached task and only logs the outcome.

use std::{
    collections::BTreeMap,
    fs::OpenOptions,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::Local;
use itertools::Itertools;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{error, info, warn};

use crate::{error::SubmitError, selection::Selection, tasks::DEFAULT_LABELS};

/// One task's confirmed answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub task: usize,
    pub label: String,
    pub selection: Selection,
}

/// Every task's confirmed answer for one session, in task order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Responses {
    pub session_id: String,
    pub entries: Vec<Response>,
}

impl Responses {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Form field identifiers receiving one task's triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIds {
    pub color: String,
    pub pattern: String,
    pub intensity: String,
}

/// Emotion label to form field identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldIds>);

impl Default for FieldMap {
    fn default() -> Self {
        let map = DEFAULT_LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let base = 1_000_100 + (i as u32 + 1) * 10;
                (
                    label.to_string(),
                    FieldIds {
                        color: format!("entry.{}", base + 1),
                        pattern: format!("entry.{}", base + 2),
                        intensity: format!("entry.{}", base + 3),
                    },
                )
            })
            .collect();
        Self(map)
    }
}

impl FieldMap {
    pub fn new(map: BTreeMap<String, FieldIds>) -> Self {
        Self(map)
    }

    pub fn get(&self, label: &str) -> Option<&FieldIds> {
        self.0.get(label)
    }

    /// Form body pairs: three per task, in task order
    pub fn encode(&self, responses: &Responses) -> Result<Vec<(String, String)>, SubmitError> {
        let mut form = Vec::with_capacity(responses.len() * 3);
        for response in &responses.entries {
            let ids = self
                .get(&response.label)
                .ok_or_else(|| SubmitError::MissingFields(response.label.clone()))?;
            let s = response.selection;
            form.push((ids.color.clone(), s.color_index.to_string()));
            form.push((ids.pattern.clone(), s.pattern_index.to_string()));
            form.push((ids.intensity.clone(), s.intensity.to_string()));
        }
        Ok(form)
    }
}

/// Receives the finished session. `submit` must not block the caller.
pub trait SubmissionSink {
    fn submit(&mut self, responses: &Responses);

    /// Wait up to `timeout` for deliveries still in flight. Only called on
    /// exit; returns false if something was still pending when time ran out.
    fn flush(&mut self, _timeout: Duration) -> bool {
        true
    }
}

impl<K: SubmissionSink + ?Sized> SubmissionSink for Box<K> {
    fn submit(&mut self, responses: &Responses) {
        (**self).submit(responses)
    }

    fn flush(&mut self, timeout: Duration) -> bool {
        (**self).flush(timeout)
    }
}

/// Posts the session as a URL-encoded form, fire-and-forget
#[derive(Debug)]
pub struct HttpSink {
    client: Client,
    endpoint: Url,
    fields: FieldMap,
    runtime: Handle,
    in_flight: Vec<JoinHandle<()>>,
}

impl HttpSink {
    pub fn new(
        endpoint: &str,
        fields: FieldMap,
        timeout: Duration,
        runtime: Handle,
    ) -> Result<Self, SubmitError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            fields,
            runtime,
            in_flight: Vec::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Spawn the POST on the runtime and hand back its task
    pub fn dispatch(&self, responses: &Responses) -> Option<JoinHandle<()>> {
        let form = match self.fields.encode(responses) {
            Ok(form) => form,
            Err(err) => {
                error!(%err, session = %responses.session_id, "submission not sent");
                return None;
            }
        };

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let session = responses.session_id.clone();
        info!(%endpoint, %session, fields = form.len(), "dispatching submission");

        Some(self.runtime.spawn(async move {
            match post_form(&client, endpoint, &form).await {
                Ok(status) => info!(%session, %status, "submission delivered"),
                Err(err) => error!(%session, %err, "submission failed"),
            }
        }))
    }
}

impl SubmissionSink for HttpSink {
    fn submit(&mut self, responses: &Responses) {
        self.in_flight.retain(|task| !task.is_finished());
        if let Some(task) = self.dispatch(responses) {
            self.in_flight.push(task);
        }
    }

    fn flush(&mut self, timeout: Duration) -> bool {
        let pending: Vec<_> = self
            .in_flight
            .drain(..)
            .filter(|task| !task.is_finished())
            .collect();
        if pending.is_empty() {
            return true;
        }

        info!(count = pending.len(), ?timeout, "waiting for in-flight submission");
        let waited = self.runtime.block_on(tokio::time::timeout(timeout, async move {
            for task in pending {
                if let Err(err) = task.await {
                    error!(%err, "submission task did not finish");
                }
            }
        }));
        if waited.is_err() {
            warn!(?timeout, "submission still in flight at exit");
            return false;
        }
        true
    }
}

/// Send one form POST and require a success status
pub async fn post_form(
    client: &Client,
    endpoint: Url,
    form: &[(String, String)],
) -> Result<StatusCode, SubmitError> {
    let response = client.post(endpoint).form(form).send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(status)
    } else {
        Err(SubmitError::Status(status))
    }
}

/// Offline sink: logs what would have been sent
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    fields: FieldMap,
    submissions: usize,
}

impl LogSink {
    pub fn new(fields: FieldMap) -> Self {
        Self {
            fields,
            submissions: 0,
        }
    }

    pub fn submissions(&self) -> usize {
        self.submissions
    }
}

impl SubmissionSink for LogSink {
    fn submit(&mut self, responses: &Responses) {
        self.submissions += 1;
        match self.fields.encode(responses) {
            Ok(form) => {
                let body = form
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .join("&");
                info!(session = %responses.session_id, %body, "offline submission");
            }
            Err(err) => warn!(%err, session = %responses.session_id, "offline submission incomplete"),
        }
    }
}

/// Appends every session to a local CSV before handing it on
#[derive(Debug)]
pub struct ArchiveSink<K> {
    inner: K,
    path: PathBuf,
}

impl<K: SubmissionSink> ArchiveSink<K> {
    pub fn new<P: AsRef<Path>>(inner: K, path: P) -> Self {
        Self {
            inner,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn inner(&self) -> &K {
        &self.inner
    }

    pub fn append(&self, responses: &Responses) -> Result<(), SubmitError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(csv::Error::from)?;
        }
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(csv::Error::from)?;
        // header only when nothing has been written yet
        let needs_header = file.metadata().map_err(csv::Error::from)?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record([
                "date",
                "session",
                "task",
                "label",
                "color",
                "pattern",
                "intensity",
            ])?;
        }

        let date = Local::now().to_rfc3339();
        for response in &responses.entries {
            let s = response.selection;
            writer.write_record(&[
                date.clone(),
                responses.session_id.clone(),
                response.task.to_string(),
                response.label.clone(),
                s.color_index.to_string(),
                s.pattern_index.to_string(),
                s.intensity.to_string(),
            ])?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

impl<K: SubmissionSink> SubmissionSink for ArchiveSink<K> {
    fn submit(&mut self, responses: &Responses) {
        if let Err(err) = self.append(responses) {
            warn!(%err, path = %self.path.display(), "could not archive responses");
        }
        self.inner.submit(responses);
    }

    fn flush(&mut self, timeout: Duration) -> bool {
        self.inner.flush(timeout)
    }
}
