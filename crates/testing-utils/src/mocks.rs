//! Scripted worker implementations for dispatcher tests
//!
//! Workers spawned by [`ScriptedWorkerFactory`] follow a per-worker [`WorkerScript`]
//! and record every command they receive so tests can assert on routing decisions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use router_core::{
    TaskResult, WorkItem, WorkerCommand, WorkerEvent, WorkerEventSender, WorkerFactory,
    WorkerHandle, WorkerMetricsSnapshot,
};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// How a scripted worker answers a dispatched work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerBehavior {
    /// Reply with a successful result after the latency
    Succeed,
    /// Reply with a failed result after the latency
    Fail,
    /// Never reply
    Silent,
    /// Reply successfully twice for the same task
    Duplicate,
}

/// Per-worker script
#[derive(Debug, Clone)]
pub struct WorkerScript {
    pub behavior: WorkerBehavior,
    pub latency: Duration,
    /// Reported as `processing_time_ms` in results
    pub processing_time_ms: u64,
    /// Reported as `current_load` in metrics snapshots
    pub load: u32,
    /// Delay before answering a metrics request, `None` answers immediately
    pub metrics_delay: Option<Duration>,
}

impl WorkerScript {
    pub fn succeed() -> Self {
        Self {
            behavior: WorkerBehavior::Succeed,
            latency: Duration::ZERO,
            processing_time_ms: 10,
            load: 0,
            metrics_delay: None,
        }
    }

    pub fn fail() -> Self {
        Self {
            behavior: WorkerBehavior::Fail,
            ..Self::succeed()
        }
    }

    pub fn silent() -> Self {
        Self {
            behavior: WorkerBehavior::Silent,
            ..Self::succeed()
        }
    }

    pub fn duplicate() -> Self {
        Self {
            behavior: WorkerBehavior::Duplicate,
            ..Self::succeed()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_processing_time(mut self, processing_time_ms: u64) -> Self {
        self.processing_time_ms = processing_time_ms;
        self
    }

    pub fn with_load(mut self, load: u32) -> Self {
        self.load = load;
        self
    }

    pub fn with_metrics_delay(mut self, delay: Duration) -> Self {
        self.metrics_delay = Some(delay);
        self
    }
}

impl Default for WorkerScript {
    fn default() -> Self {
        Self::succeed()
    }
}

#[derive(Debug, Default)]
struct Recorder {
    spawned: Vec<String>,
    stopped: Vec<String>,
    dispatched: Vec<(String, String)>,
}

/// Worker factory producing scripted in-process workers
///
/// Scripts are looked up by worker id at spawn time and fall back to the default script.
#[derive(Clone)]
pub struct ScriptedWorkerFactory {
    default_script: WorkerScript,
    scripts: Arc<Mutex<HashMap<String, WorkerScript>>>,
    recorder: Arc<Mutex<Recorder>>,
}

impl ScriptedWorkerFactory {
    pub fn new(default_script: WorkerScript) -> Self {
        Self {
            default_script,
            scripts: Arc::new(Mutex::new(HashMap::new())),
            recorder: Arc::new(Mutex::new(Recorder::default())),
        }
    }

    /// All workers succeed immediately
    pub fn succeeding() -> Self {
        Self::new(WorkerScript::succeed())
    }

    /// Script the worker that will be spawned with `worker_id`
    pub fn with_script(self, worker_id: &str, script: WorkerScript) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(worker_id.to_string(), script);
        self
    }

    pub fn spawned_workers(&self) -> Vec<String> {
        self.recorder.lock().unwrap().spawned.clone()
    }

    pub fn stopped_workers(&self) -> Vec<String> {
        self.recorder.lock().unwrap().stopped.clone()
    }

    /// `(worker_id, task_id)` pairs in dispatch order
    pub fn dispatched(&self) -> Vec<(String, String)> {
        self.recorder.lock().unwrap().dispatched.clone()
    }

    /// Worker ids in dispatch order
    pub fn dispatch_targets(&self) -> Vec<String> {
        self.dispatched()
            .into_iter()
            .map(|(worker_id, _)| worker_id)
            .collect()
    }

    fn script_for(&self, worker_id: &str) -> WorkerScript {
        self.scripts
            .lock()
            .unwrap()
            .get(worker_id)
            .cloned()
            .unwrap_or_else(|| self.default_script.clone())
    }
}

impl WorkerFactory for ScriptedWorkerFactory {
    fn spawn_worker(&self, worker_id: &str, events: WorkerEventSender) -> WorkerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let script = self.script_for(worker_id);
        self.recorder
            .lock()
            .unwrap()
            .spawned
            .push(worker_id.to_string());

        tokio::spawn(run_scripted_worker(
            worker_id.to_string(),
            script,
            rx,
            events,
            self.recorder.clone(),
        ));

        WorkerHandle::new(worker_id, tx)
    }
}

async fn run_scripted_worker(
    worker_id: String,
    script: WorkerScript,
    mut commands: mpsc::UnboundedReceiver<WorkerCommand>,
    events: WorkerEventSender,
    recorder: Arc<Mutex<Recorder>>,
) {
    let mut tasks_processed = 0u64;
    // Delayed replies live here so that `Stop` ends every pending emission
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(WorkerCommand::Dispatch(item)) => {
                    recorder
                        .lock()
                        .unwrap()
                        .dispatched
                        .push((worker_id.clone(), item.task_id.clone()));
                    tasks_processed += 1;
                    answer(&worker_id, &script, item, &events, &mut in_flight);
                }
                Some(WorkerCommand::RequestMetrics(reply)) => {
                    let snapshot = WorkerMetricsSnapshot {
                        worker_id: worker_id.clone(),
                        tasks_processed,
                        current_load: script.load,
                        avg_processing_time_ms: script.processing_time_ms as f64,
                        is_available: true,
                    };
                    match script.metrics_delay {
                        Some(delay) => {
                            in_flight.spawn(async move {
                                tokio::time::sleep(delay).await;
                                let _ = reply.send(snapshot);
                            });
                        }
                        None => {
                            let _ = reply.send(snapshot);
                        }
                    }
                }
                Some(WorkerCommand::Stop) => {
                    recorder.lock().unwrap().stopped.push(worker_id.clone());
                    break;
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    in_flight.shutdown().await;
}

fn answer(
    worker_id: &str,
    script: &WorkerScript,
    item: WorkItem,
    events: &WorkerEventSender,
    in_flight: &mut JoinSet<()>,
) {
    let result = match script.behavior {
        WorkerBehavior::Silent => return,
        WorkerBehavior::Fail => TaskResult {
            processing_time_ms: script.processing_time_ms,
            ..TaskResult::failure(item.task_id.as_str(), format!("{worker_id} failed"))
        },
        WorkerBehavior::Succeed | WorkerBehavior::Duplicate => TaskResult::success(
            item.task_id.as_str(),
            format!("{worker_id} done"),
            script.processing_time_ms,
        ),
    };
    let repeats = if script.behavior == WorkerBehavior::Duplicate {
        2
    } else {
        1
    };

    let event = WorkerEvent::Completed {
        task_id: item.task_id,
        worker_id: worker_id.to_string(),
        result,
    };
    let send_all = {
        let events = events.clone();
        move |event: WorkerEvent| {
            for _ in 0..repeats {
                let _ = events.send(event.clone());
            }
        }
    };

    if script.latency.is_zero() {
        send_all(event);
    } else {
        let latency = script.latency;
        in_flight.spawn(async move {
            tokio::time::sleep(latency).await;
            send_all(event);
        });
    }
}
