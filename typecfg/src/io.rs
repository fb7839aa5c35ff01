//! File operations.
//!
//! Every operation targets [`Configuration::path`]. The synchronous
//! functions do the work on the calling thread; the `_async` variants run
//! the same body on tokio's blocking pool and hand back a [`PendingIo`]
//! that can be awaited or cancelled.
//!
//! A read only touches the configuration after the whole file decoded and
//! validated. A write goes to a temporary file in the target directory and
//! is renamed into place, so the previous file survives any failure.

use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use tempfile::NamedTempFile;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::codec::{Format, LoadedValues};
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::options::IoOptions;

/// Reads the configuration file and applies its values.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, and otherwise any
/// parse, identity, reconciliation or validation error from the codec. On
/// error the configuration is unchanged.
///
/// # Examples
///
/// ```
/// use typecfg::{io, Configuration, Format, IoOptions, PropertyDefinition};
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut builder = Configuration::builder();
/// builder.name("app").version("1").filename("app.json").pathname(dir.path());
/// builder.put(PropertyDefinition::builder("port").value(8080).build().unwrap()).unwrap();
/// let mut config = builder.build().unwrap();
///
/// io::write(&config, Format::Json, &IoOptions::default()).unwrap();
/// config.set_value("port", 1).unwrap();
/// io::read(&mut config, Format::Json, &IoOptions::default()).unwrap();
/// assert_eq!(config.value("port").unwrap().as_int().unwrap(), 8080);
/// ```
pub fn read(config: &mut Configuration, format: Format, options: &IoOptions) -> Result<()> {
    let loaded = load(config, format, options)?;
    loaded.apply(config)
}

/// Encodes the configuration and writes it to its file.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns the codec's encoding error, or [`Error::Io`] if the file cannot
/// be written.
pub fn write(config: &Configuration, format: Format, options: &IoOptions) -> Result<()> {
    let path = config.path();
    let encoded = format.encode(config, options)?;

    if let Some(parent) = parent_dir(&path) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    if options.atomic_write {
        write_atomic(&path, &encoded)?;
    } else {
        fs::write(&path, &encoded).map_err(|e| Error::io(&path, e))?;
    }

    log::info!(
        "saved {} properties to {} ({format})",
        config.len(),
        path.display()
    );
    config.notify_saved(&path, format);
    Ok(())
}

/// Removes the configuration file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file does not exist or cannot be removed.
pub fn delete(config: &Configuration) -> Result<()> {
    let path = config.path();
    fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
    log::info!("deleted {}", path.display());
    config.notify_deleted(&path);
    Ok(())
}

/// Returns `true` if the configuration file exists.
#[must_use]
pub fn exists(config: &Configuration) -> bool {
    config.exists()
}

/// Decodes the configuration file without applying it.
///
/// # Errors
///
/// Same as [`read`].
pub fn load(config: &Configuration, format: Format, options: &IoOptions) -> Result<LoadedFile> {
    let path = config.path();
    let input = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let values = format.decode(config, &input, options.policy)?;
    log::debug!(
        "decoded {} of {} properties from {}",
        values.len(),
        config.len(),
        path.display()
    );
    Ok(LoadedFile {
        path,
        format,
        values,
    })
}

/// Decoded file contents waiting to be applied.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    path: PathBuf,
    format: Format,
    values: LoadedValues,
}

impl LoadedFile {
    /// The file the values came from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The format the file was decoded as.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// The decoded values.
    #[must_use]
    pub const fn values(&self) -> &LoadedValues {
        &self.values
    }

    /// Commits the values to `config` and notifies its listeners.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Configuration::commit`]; nothing is applied
    /// in that case.
    pub fn apply(self, config: &mut Configuration) -> Result<()> {
        let count = self.values.len();
        config.commit(self.values)?;
        log::info!(
            "loaded {count} properties from {} ({})",
            self.path.display(),
            self.format
        );
        config.notify_loaded(&self.path, self.format);
        Ok(())
    }
}

/// Schedules [`load`] on the blocking pool.
///
/// The worker decodes against a snapshot of the schema; apply the result
/// with [`LoadedFile::apply`] once it resolves.
///
/// Must be called from within a tokio runtime; otherwise the handle
/// resolves to [`Error::Task`].
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use typecfg::{io, Configuration, Format, IoOptions, PropertyDefinition};
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut builder = Configuration::builder();
/// builder.name("app").version("1").filename("app.yaml").pathname(dir.path());
/// builder.put(PropertyDefinition::builder("debug").value(true).build().unwrap()).unwrap();
/// let mut config = builder.build().unwrap();
///
/// io::write_async(&config, Format::Yaml, IoOptions::default()).await.unwrap();
/// let loaded = io::read_async(&config, Format::Yaml, IoOptions::default()).await.unwrap();
/// loaded.apply(&mut config).unwrap();
/// # }
/// ```
pub fn read_async(
    config: &Configuration,
    format: Format,
    options: IoOptions,
) -> PendingIo<LoadedFile> {
    let schema = config.snapshot();
    PendingIo::spawn(move || load(&schema, format, &options))
}

/// Schedules [`write`] on the blocking pool.
///
/// The worker writes a copy of `config` taken at call time. Listeners are
/// notified from the worker thread.
pub fn write_async(config: &Configuration, format: Format, options: IoOptions) -> PendingIo<()> {
    let config = config.clone();
    PendingIo::spawn(move || write(&config, format, &options))
}

/// Schedules [`delete`] on the blocking pool.
pub fn delete_async(config: &Configuration) -> PendingIo<()> {
    let config = config.clone();
    PendingIo::spawn(move || delete(&config))
}

/// Handle to a file operation running in the background.
///
/// Resolves to the operation's result. [`cancel`](Self::cancel) only
/// prevents work that has not started yet; a file operation already in
/// progress runs to completion.
#[derive(Debug)]
pub struct PendingIo<T> {
    state: State<T>,
}

#[derive(Debug)]
enum State<T> {
    Running(JoinHandle<Result<T>>),
    Failed(Option<Error>),
}

impl<T: Send + 'static> PendingIo<T> {
    fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let state = match Handle::try_current() {
            Ok(runtime) => State::Running(runtime.spawn_blocking(work)),
            Err(e) => State::Failed(Some(Error::Task {
                message: e.to_string(),
            })),
        };
        Self { state }
    }
}

impl<T> PendingIo<T> {
    /// Requests cancellation.
    ///
    /// If the worker has not started, awaiting the handle yields
    /// [`Error::Cancelled`].
    pub fn cancel(&self) {
        if let State::Running(handle) = &self.state {
            handle.abort();
        }
    }

    /// Returns `true` once the operation has finished, successfully or not.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Running(handle) => handle.is_finished(),
            State::Failed(_) => true,
        }
    }
}

impl<T> Future for PendingIo<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Running(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(e)) if e.is_cancelled() => Poll::Ready(Err(Error::Cancelled)),
                Poll::Ready(Err(e)) => Poll::Ready(Err(Error::Task {
                    message: e.to_string(),
                })),
                Poll::Pending => Poll::Pending,
            },
            State::Failed(error) => Poll::Ready(Err(error.take().unwrap_or(Error::Task {
                message: "handle polled after completion".into(),
            }))),
        }
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = parent_dir(path).unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| Error::io(file.path(), e))?;

    // keep the mode of the file being replaced
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(file.path(), metadata.permissions())
            .map_err(|e| Error::io(file.path(), e))?;
    }

    file.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyDefinition;
    use crate::value::TypedValue;
    use tempfile::TempDir;

    fn config(dir: &Path, filename: &str) -> Configuration {
        let mut builder = Configuration::builder();
        builder
            .name("app")
            .version("1.0")
            .filename(filename)
            .pathname(dir);
        builder
            .put(PropertyDefinition::builder("lang").value("EN").build().unwrap())
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path(), "app.json");
        write(&config, Format::Json, &IoOptions::default()).unwrap();
        assert!(exists(&config));

        config.set_value("lang", "FR").unwrap();
        read(&mut config, Format::Json, &IoOptions::strict()).unwrap();
        assert_eq!(config.value("lang").unwrap(), &TypedValue::from("EN"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path(), "absent.json");
        let err = read(&mut config, Format::Json, &IoOptions::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir.path().join("a").join("b"), "app.cfg");
        write(&config, Format::Text, &IoOptions::default()).unwrap();
        assert!(config.path().is_file());
    }

    #[test]
    fn test_direct_write() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), "app.cfg");
        write(
            &config,
            Format::Text,
            &IoOptions::default().with_atomic_write(false),
        )
        .unwrap();
        assert_eq!(fs::read_to_string(config.path()).unwrap(), "lang=EN;\n");
    }

    #[test]
    fn test_failed_encode_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, "original").unwrap();

        let mut builder = Configuration::builder();
        builder.filename("app.json").pathname(dir.path());
        let anonymous = builder.build().unwrap();
        assert!(write(&anonymous, Format::Json, &IoOptions::default()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), "app.xml");
        write(&config, Format::Xml, &IoOptions::default()).unwrap();
        write(&config, Format::Xml, &IoOptions::default()).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), "app.csv");
        write(&config, Format::Csv, &IoOptions::default()).unwrap();
        delete(&config).unwrap();
        assert!(!exists(&config));
        assert!(delete(&config).unwrap_err().is_not_found());
    }

    #[test]
    fn test_load_does_not_apply() {
        let dir = TempDir::new().unwrap();
        let mut config = config(dir.path(), "app.yaml");
        write(&config, Format::Yaml, &IoOptions::default()).unwrap();
        config.set_value("lang", "DE").unwrap();

        let loaded = load(&config, Format::Yaml, &IoOptions::default()).unwrap();
        assert_eq!(loaded.format(), Format::Yaml);
        assert_eq!(loaded.values().get("lang"), Some(&TypedValue::from("EN")));
        assert_eq!(config.value("lang").unwrap(), &TypedValue::from("DE"));

        loaded.apply(&mut config).unwrap();
        assert_eq!(config.value("lang").unwrap(), &TypedValue::from("EN"));
    }

    #[test]
    fn test_async_outside_runtime() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), "app.json");
        let pending = write_async(&config, Format::Json, IoOptions::default());
        assert!(pending.is_finished());
        let result = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(pending);
        assert!(matches!(result, Err(Error::Task { .. })));
    }
}
