use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use athenaeum_core::models::{PendingFile, StoredFile};
use athenaeum_storage::{StorageUploader, UploadError, UploadResult};
use tokio::sync::Notify;

/// Pauses an upload until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub reached: Notify,
    pub release: Notify,
}

/// Storage fake recording every call in order.
#[derive(Default)]
pub struct FakeUploader {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, usize>>,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
}

impl FakeUploader {
    /// Fail the next `times` uploads of `name`.
    pub fn fail(&self, name: &str, times: usize) {
        self.failures.lock().unwrap().insert(name.to_string(), times);
    }

    /// Hold the next upload of `name` until `Gate::release` is notified.
    pub fn hold(&self, name: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .unwrap()
            .insert(name.to_string(), gate.clone());
        gate
    }

    /// File names in the order uploads were attempted.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }
}

#[async_trait]
impl StorageUploader for FakeUploader {
    async fn upload(&self, file: &PendingFile, folder: &str) -> UploadResult<StoredFile> {
        self.calls.lock().unwrap().push(file.name.clone());

        let gate = self.gates.lock().unwrap().remove(&file.name);
        if let Some(gate) = gate {
            gate.reached.notify_one();
            gate.release.notified().await;
        }

        let should_fail = {
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(&file.name) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_fail {
            return Err(UploadError::new(
                &file.name,
                anyhow::anyhow!("storage returned 503"),
            ));
        }

        Ok(StoredFile {
            file_url: format!("https://cdn.test/{}/{}", folder, file.name),
            file_name: file.name.clone(),
        })
    }
}
