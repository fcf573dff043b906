//! Session recording. A record file holds the starting config on its first
//! line followed by one event per line, all in RON, and can be fed back
//! through a headless reactor with [`replay`].

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
#[cfg(test)]
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{Event, Reactor};
use crate::common::config::Config;
use crate::model::window::WindowSummary;
use crate::sys::headless::HeadlessHost;
use crate::sys::timer::SystemClock;

#[derive(Default)]
pub struct Record {
    file: Option<File>,
    #[cfg(test)]
    temp: Option<NamedTempFile>,
}

impl Record {
    pub fn new(path: Option<&Path>) -> io::Result<Self> {
        Ok(Self {
            file: path.map(File::create).transpose()?,
            #[cfg(test)]
            temp: None,
        })
    }

    /// A record that writes nothing.
    pub fn none() -> Self { Self::default() }

    #[cfg(test)]
    pub fn new_for_test(temp: NamedTempFile) -> Self { Self { file: None, temp: Some(temp) } }

    fn file(&mut self) -> Option<&mut File> {
        #[cfg(test)]
        return self.file.as_mut().or(self.temp.as_mut().map(|temp| temp.as_file_mut()));
        #[cfg(not(test))]
        self.file.as_mut()
    }

    pub(super) fn start(&mut self, config: &Config) {
        let line = match ron::ser::to_string(config) {
            Ok(line) => line,
            Err(e) => {
                warn!("could not serialize config for recording: {e}");
                return self.stop();
            }
        };
        self.write_line(&line);
    }

    pub(super) fn on_event(&mut self, event: &Event) {
        if self.file().is_none() {
            return;
        }
        match ron::ser::to_string(event) {
            Ok(line) => self.write_line(&line),
            Err(e) => warn!(event = event.name(), "could not serialize event for recording: {e}"),
        }
    }

    fn write_line(&mut self, line: &str) {
        let Some(file) = self.file() else { return };
        if let Err(e) = writeln!(file, "{line}") {
            warn!("recording stopped after write error: {e}");
            self.stop();
        }
    }

    fn stop(&mut self) {
        self.file = None;
        #[cfg(test)]
        {
            self.temp = None;
        }
    }
}

/// Runs a recorded session against a headless host with animations off.
/// `on_publish` sees every window list the reactor publishes, in order.
pub fn replay(path: &Path, mut on_publish: impl FnMut(&[WindowSummary])) -> anyhow::Result<()> {
    let file = BufReader::new(
        File::open(path).with_context(|| format!("opening record file {}", path.display()))?,
    );
    let mut lines = file.lines();
    let first = lines.next().context("record file is empty")??;
    let mut config: Config = ron::de::from_str(&first).context("parsing recorded config")?;
    config.settings.animate = false;

    let host = HeadlessHost::new();
    let mut reactor =
        Reactor::new(config, host.collaborators(), Box::new(SystemClock), Record::none());

    let mut seen = 0;
    for (index, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut event: Event = ron::de::from_str(&line)
            .with_context(|| format!("parsing event on line {}", index + 2))?;
        if let Event::ConfigUpdated(config) = &mut event {
            config.settings.animate = false;
        }
        debug!(event = event.name(), "replaying");
        reactor.handle_event(event);

        let state = host.state();
        for published in &state.published[seen..] {
            on_publish(published);
        }
        seen = state.published.len();
    }
    Ok(())
}
