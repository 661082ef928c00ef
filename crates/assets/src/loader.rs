use std::io::Read;
use std::path::PathBuf;

use crate::{AssetError, LoadedModel};

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Bytes of the model file read so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl LoadProgress {
    /// Fraction in `[0, 1]`, or `None` when the total size is unknown.
    pub fn fraction(&self) -> Option<f32> {
        (self.total > 0).then(|| (self.loaded as f64 / self.total as f64).min(1.0) as f32)
    }
}

/// Messages a background load sends to the frame loop.
#[derive(Debug)]
pub enum LoadEvent {
    Progress(LoadProgress),
    Loaded(LoadedModel),
    Failed(AssetError),
}

impl LoadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadEvent::Progress(_))
    }
}

/// Loads one model file, either on the calling thread or in the background.
#[derive(Debug, Clone)]
pub struct ModelLoader {
    path: PathBuf,
    chunk_size: usize,
}

impl ModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Read granularity, which is also the progress reporting granularity.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Read and import the model, reporting progress after every chunk.
    pub fn load(
        &self,
        mut on_progress: impl FnMut(LoadProgress),
    ) -> Result<LoadedModel, AssetError> {
        let mut file = std::fs::File::open(&self.path)?;
        let total = file.metadata()?.len();
        let mut bytes = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let n = file.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..n]);
            on_progress(LoadProgress {
                loaded: bytes.len() as u64,
                total,
            });
        }

        let mut model = crate::import_slice(&bytes, self.path.parent())?;
        crate::import::named_after_dir(&mut model, &self.path);
        Ok(model)
    }

    /// Load and send every event to `tx`. Returns whether the terminal event
    /// was delivered; a dropped receiver is not an error.
    fn run(&self, tx: &flume::Sender<LoadEvent>) -> bool {
        let _span = tracing::info_span!("model_load", path = %self.path.display()).entered();
        let result = self.load(|progress| {
            let _ = tx.send(LoadEvent::Progress(progress));
        });
        let event = match result {
            Ok(model) => LoadEvent::Loaded(model),
            Err(e) => LoadEvent::Failed(e),
        };
        if tx.send(event).is_err() {
            tracing::debug!("load finished after its handle was dropped");
            return false;
        }
        true
    }

    /// Start the load on a background thread.
    ///
    /// The handle may be dropped at any time; a load that finishes after that
    /// discards its result.
    pub fn spawn(self) -> LoadHandle {
        let (tx, rx) = flume::unbounded();
        let worker_tx = tx.clone();

        let spawned = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                self.run(&worker_tx);
            });

        if let Err(e) = spawned {
            let _ = tx.send(LoadEvent::Failed(AssetError::Io(e)));
        }
        drop(tx);

        LoadHandle {
            rx,
            finished: false,
        }
    }
}

/// Receiving end of a background load, drained once per frame.
#[derive(Debug)]
pub struct LoadHandle {
    rx: flume::Receiver<LoadEvent>,
    finished: bool,
}

impl LoadHandle {
    /// Drain every event that has arrived, without blocking.
    ///
    /// If the worker goes away without a terminal event, a single
    /// [`AssetError::LoaderStopped`] failure is synthesized.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    let terminal = event.is_terminal();
                    events.push(event);
                    if terminal {
                        self.finished = true;
                        break;
                    }
                }
                Err(flume::TryRecvError::Empty) => break,
                Err(flume::TryRecvError::Disconnected) => {
                    self.finished = true;
                    events.push(LoadEvent::Failed(AssetError::LoaderStopped));
                    break;
                }
            }
        }
        events
    }

    /// Whether the terminal event has been handed out.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TRIANGLE_GLTF;
    use std::path::Path;
    use std::time::{Duration, Instant};

    fn drain_until_finished(handle: &mut LoadHandle) -> Vec<LoadEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while !handle.is_finished() {
            assert!(Instant::now() < deadline, "loader did not finish");
            events.extend(handle.poll());
            std::thread::sleep(Duration::from_millis(1));
        }
        events
    }

    fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("scene.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();
        path
    }

    #[test]
    fn progress_fraction() {
        let p = LoadProgress {
            loaded: 50,
            total: 200,
        };
        assert_eq!(p.fraction(), Some(0.25));
        let unknown = LoadProgress {
            loaded: 50,
            total: 0,
        };
        assert_eq!(unknown.fraction(), None);
    }

    #[test]
    fn blocking_load_reports_progress_up_to_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let mut seen = Vec::new();
        let model = ModelLoader::new(&path)
            .with_chunk_size(100)
            .load(|p| seen.push(p))
            .unwrap();

        assert_eq!(model.triangle_count(), 1);
        let total = TRIANGLE_GLTF.len() as u64;
        assert!(seen.len() > 1);
        assert!(seen.windows(2).all(|w| w[0].loaded < w[1].loaded));
        assert_eq!(seen.last().unwrap().loaded, total);
        assert!(seen.iter().all(|p| p.total == total));
    }

    #[test]
    fn background_load_ends_with_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let mut handle = ModelLoader::new(&path).with_chunk_size(256).spawn();
        let events = drain_until_finished(&mut handle);

        let (last, rest) = events.split_last().unwrap();
        assert!(matches!(last, LoadEvent::Loaded(m) if m.triangle_count() == 1));
        assert!(rest.iter().all(|e| matches!(e, LoadEvent::Progress(_))));
        assert!(handle.poll().is_empty());
    }

    #[test]
    fn background_load_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = ModelLoader::new(dir.path().join("missing.gltf")).spawn();
        let events = drain_until_finished(&mut handle);

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LoadEvent::Failed(AssetError::Io(_))));
    }

    #[test]
    fn blocking_load_is_named_after_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("falcon");
        std::fs::create_dir(&model_dir).unwrap();
        let path = write_fixture(&model_dir);

        let model = ModelLoader::new(&path).load(|_| {}).unwrap();
        assert_eq!(model.name, "falcon");
    }

    #[test]
    fn load_finishing_after_receiver_drop_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());
        let loader = ModelLoader::new(&path).with_chunk_size(1);

        let (tx, rx) = flume::unbounded();
        drop(rx);
        let worker = std::thread::spawn(move || loader.run(&tx));
        let delivered = worker.join().expect("load thread panicked");
        assert!(!delivered);
    }

    #[test]
    fn run_delivers_terminal_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());
        let (tx, rx) = flume::unbounded();

        assert!(ModelLoader::new(&path).run(&tx));
        let last = rx.try_iter().last();
        assert!(matches!(last, Some(LoadEvent::Loaded(_))));
    }

    #[test]
    fn vanished_worker_yields_one_loader_stopped() {
        let (tx, rx) = flume::unbounded();
        tx.send(LoadEvent::Progress(LoadProgress {
            loaded: 1,
            total: 10,
        }))
        .unwrap();
        drop(tx);

        let mut handle = LoadHandle {
            rx,
            finished: false,
        };
        let events = handle.poll();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], LoadEvent::Progress(_)));
        assert!(matches!(
            events[1],
            LoadEvent::Failed(AssetError::LoaderStopped)
        ));
        assert!(handle.is_finished());
        assert!(handle.poll().is_empty());
        assert!(handle.poll().is_empty());
    }
}
