use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;

use thrift_schema::Loader;
use thrift_schema::MemoryHost;

#[derive(Clone, Default)]
struct SharedWriter {
  buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
  fn into_inner(self) -> Vec<u8> {
    match Arc::try_unwrap(self.buffer) {
      Ok(buffer) => buffer.into_inner().unwrap(),
      Err(arc) => arc.lock().unwrap().clone(),
    }
  }
}

struct SharedWriterGuard<'a> {
  buffer: &'a Arc<Mutex<Vec<u8>>>,
}

impl<'a> io::Write for SharedWriterGuard<'a> {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.buffer.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<'a> MakeWriter<'a> for SharedWriter {
  type Writer = SharedWriterGuard<'a>;

  fn make_writer(&'a self) -> Self::Writer {
    SharedWriterGuard {
      buffer: &self.buffer,
    }
  }
}

#[test]
fn tracing_emits_phase_spans() {
  let writer = SharedWriter::default();
  let subscriber = tracing_subscriber::fmt()
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(tracing::Level::DEBUG)
    .with_ansi(false)
    .with_writer(writer.clone())
    .finish();
  let _guard = tracing::subscriber::set_default(subscriber);

  let host = MemoryHost::new().with_file("/main.thrift", "typedef i32 Id\nstruct S { 1: Id id }");
  let mut loader = Loader::new(host);
  loader.add_thrift_file("/main.thrift");
  let schema = loader.load().unwrap();
  assert_eq!(schema.structs().len(), 1);

  drop(_guard);
  let output = String::from_utf8(writer.into_inner()).unwrap();
  for expected in [
    "phase=\"register\"",
    "phase=\"link\"",
    "registered file",
    "resolved typedef",
    "loaded schema",
    "duration_ms",
  ] {
    assert!(output.contains(expected), "expected {expected} in: {output}");
  }
}
