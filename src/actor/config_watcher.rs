use std::collections::HashSet;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, thread};

use notify::RecursiveMode;
use notify_debouncer_mini::{
    DebounceEventResult, DebouncedEvent, DebouncedEventKind, new_debouncer,
};
use tracing::{debug, error, info, trace, warn};

use crate::actor::reactor::{self, Event};
use crate::common::config::Config;

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches the config file and sends the reactor a fresh [`Config`] whenever
/// it changes, as long as `settings.hot_reload` is on.
pub struct ConfigWatcher {
    file: PathBuf,
    real_file: Option<PathBuf>,
    real_file_id: Option<(u64, u64)>,
    events_tx: reactor::Sender,
    enabled: bool,
    no_animate: bool,
}

impl ConfigWatcher {
    /// `no_animate` is re-applied to every reloaded config so that a
    /// command-line override survives edits to the file.
    pub fn new(
        events_tx: reactor::Sender,
        config: &Config,
        config_path: PathBuf,
        no_animate: bool,
    ) -> Self {
        let real_file = fs::canonicalize(&config_path).ok();
        let real_file_id = real_file
            .as_ref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|m| (m.dev(), m.ino()));
        ConfigWatcher {
            file: config_path,
            real_file,
            real_file_id,
            events_tx,
            enabled: config.settings.hot_reload,
            no_animate,
        }
    }

    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new().name("config-watcher".to_string()).spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("failed to start config-watcher runtime: {e}");
                    return;
                }
            };
            if let Err(e) = runtime.block_on(self.run()) {
                warn!("config-watcher: error: {e:?}");
            }
        })
    }

    async fn run(mut self) -> notify::Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<DebouncedEvent>();

        let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for e in events {
                    if e.kind == DebouncedEventKind::Any {
                        let _ = tx.send(e);
                    }
                }
            }
        })?;

        let watcher = debouncer.watcher();

        let mut parents: HashSet<PathBuf> = HashSet::new();
        if let Some(p) = self.file.parent() {
            parents.insert(p.to_path_buf());
        }
        if let Some(real) = &self.real_file
            && let Some(p) = real.parent()
        {
            parents.insert(p.to_path_buf());
        }

        for dir in parents.iter() {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            info!("watching {:?}", dir);
        }

        while let Some(event) = rx.recv().await {
            if !self.is_relevant(&event.path) {
                continue;
            }
            trace!("change detected (debounced): {:?} {:?}", event.kind, event.path);
            if self.reload().is_err() {
                break;
            }
        }

        Ok(())
    }

    /// Re-reads the file and forwards it. A file that turns `hot_reload` back
    /// on is applied even while reloading is disabled. Returns `Err` once the
    /// reactor has gone away.
    fn reload(&mut self) -> Result<(), ()> {
        let mut config = match Config::read(&self.file) {
            Ok(config) => config,
            Err(e) => {
                warn!("not reloading config: {e:#}");
                return Ok(());
            }
        };
        if !self.enabled && !config.settings.hot_reload {
            debug!("hot reload disabled, ignoring change");
            return Ok(());
        }
        self.enabled = config.settings.hot_reload;
        config.settings.animate &= !self.no_animate;
        info!("config changed, reloading");
        self.events_tx.try_send(Event::ConfigUpdated(config)).map_err(|_| ())
    }

    fn is_relevant(&self, path: &Path) -> bool {
        if path == self.file {
            return true;
        }

        if let Some(real) = &self.real_file {
            if path == real {
                return true;
            }

            if let Ok(ev_real) = fs::canonicalize(path)
                && ev_real == *real
            {
                return true;
            }

            if let Ok(meta) = fs::metadata(path)
                && let Some((dev, ino)) = self.real_file_id
                && meta.dev() == dev
                && meta.ino() == ino
            {
                return true;
            }
        }

        path.file_name().is_some_and(|n| Some(n) == self.file.file_name())
    }
}
