//! Child process plumbing: combined output, line iteration and termination.

use std::io::{self, BufRead, BufReader, PipeReader};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lines of a child's combined stdout and stderr, in the order it wrote them.
///
/// Invalid UTF-8 is replaced rather than rejected; trailing `\n`/`\r\n` is stripped.
pub struct OutputLines {
  reader: BufReader<PipeReader>,
  buf: Vec<u8>,
}

impl OutputLines {
  fn new(reader: PipeReader) -> Self {
    Self {
      reader: BufReader::new(reader),
      buf: Vec::new(),
    }
  }
}

impl Iterator for OutputLines {
  type Item = io::Result<String>;

  fn next(&mut self) -> Option<Self::Item> {
    self.buf.clear();
    match self.reader.read_until(b'\n', &mut self.buf) {
      Ok(0) => None,
      Ok(_) => {
        if self.buf.last() == Some(&b'\n') {
          self.buf.pop();
          if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
          }
        }
        Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
      }
      Err(err) => Some(Err(err)),
    }
  }
}

/// Spawn `command` with stdout and stderr sharing one pipe.
///
/// The command is consumed so the parent's copies of the write end are closed
/// once the child is running; otherwise the reader would never see EOF.
///
/// On Unix the child leads its own process group, so [`terminate`] also reaches
/// any helpers it spawned. Those inherit the write end and would otherwise
/// hold the pipe open after the child is gone.
pub fn spawn_combined(mut command: Command) -> io::Result<(Child, OutputLines)> {
  let (reader, writer) = io::pipe()?;
  let writer_err = writer.try_clone()?;
  command.stdout(writer).stderr(writer_err);
  #[cfg(unix)]
  {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
  }
  let child = command.spawn()?;
  drop(command);
  Ok((child, OutputLines::new(reader)))
}

/// Ask `child` and its process group to stop, then kill them if the child is
/// still alive after `grace`.
///
/// Returns immediately if the child has already exited.
pub fn terminate(child: &mut Child, grace: Duration) -> io::Result<()> {
  if child.try_wait()?.is_some() {
    return Ok(());
  }

  request_stop(child)?;

  let deadline = Instant::now() + grace;
  while Instant::now() < deadline {
    if child.try_wait()?.is_some() {
      // helpers that outlived the leader still hold the pipe
      force_stop(child)?;
      return Ok(());
    }
    thread::sleep(POLL_INTERVAL);
  }

  debug!(pid = child.id(), "grace period elapsed, killing");
  force_stop(child)?;
  child.wait()?;
  Ok(())
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: rustix::process::Signal) -> io::Result<()> {
  use rustix::io::Errno;
  use rustix::process::{Pid, kill_process_group};

  match kill_process_group(Pid::from_child(child), signal) {
    Err(e) if e != Errno::SRCH => Err(io::Error::from_raw_os_error(e.raw_os_error())),
    _ => Ok(()),
  }
}

#[cfg(unix)]
fn request_stop(child: &mut Child) -> io::Result<()> {
  signal_group(child, rustix::process::Signal::TERM)
}

#[cfg(unix)]
fn force_stop(child: &mut Child) -> io::Result<()> {
  signal_group(child, rustix::process::Signal::KILL)
}

#[cfg(not(unix))]
fn request_stop(child: &mut Child) -> io::Result<()> {
  child.kill()
}

#[cfg(not(unix))]
fn force_stop(child: &mut Child) -> io::Result<()> {
  child.kill()
}
