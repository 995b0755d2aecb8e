use std::{
    io::{self, Write},
    sync::mpsc::{self, Receiver, SyncSender},
    thread::{self, JoinHandle},
};

type Ack = SyncSender<io::Result<()>>;

enum Message {
    Data(Vec<u8>, Option<Ack>),
    Flush(Ack),
}

/// Moves writes to a background thread through a bounded queue.
///
/// `write` returns as soon as the bytes are queued and blocks only while the
/// queue is full. Writes reach the inner writer in the order they were
/// queued. Errors from the inner writer on data writes are dropped; `flush`
/// waits for everything queued before it and reports the inner flush result.
/// Dropping the writer drains the queue and joins the worker.
///
/// A writer created with [`AsyncWriter::blocking`] instead waits for each
/// write to be written and flushed by the worker, and reports its error. Use
/// it where the writer may never be dropped, such as in a `static`, since
/// queued bytes are lost when the process exits.
pub struct AsyncWriter {
    sender: Option<SyncSender<Message>>,
    worker: Option<JoinHandle<()>>,
    wait: bool,
}

impl AsyncWriter {
    pub fn new<W: Write + Send + 'static>(inner: W, capacity: usize) -> Self {
        Self::spawn(inner, capacity, false)
    }

    pub fn blocking<W: Write + Send + 'static>(inner: W, capacity: usize) -> Self {
        Self::spawn(inner, capacity, true)
    }

    pub fn is_blocking(&self) -> bool {
        self.wait
    }

    fn spawn<W: Write + Send + 'static>(inner: W, capacity: usize, wait: bool) -> Self {
        let (sender, receiver) = mpsc::sync_channel(capacity.max(1));
        let worker = thread::Builder::new()
            .name("conlog-async-writer".into())
            .spawn(move || run(inner, receiver))
            .ok();
        Self {
            sender: worker.as_ref().map(|_| sender),
            worker,
            wait,
        }
    }

    fn send(&self, message: Message) -> io::Result<()> {
        let sender = self.sender.as_ref().ok_or_else(worker_gone)?;
        sender.send(message).map_err(|_| worker_gone())
    }

    fn send_and_wait(&self, message: impl FnOnce(Ack) -> Message) -> io::Result<()> {
        let (ack, done) = mpsc::sync_channel(1);
        self.send(message(ack))?;
        done.recv().map_err(|_| worker_gone())?
    }
}

impl Write for AsyncWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.wait {
            self.send_and_wait(|ack| Message::Data(buf.to_vec(), Some(ack)))?;
        } else {
            self.send(Message::Data(buf.to_vec(), None))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_and_wait(Message::Flush)
    }
}

impl Drop for AsyncWriter {
    fn drop(&mut self) {
        self.sender = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run<W: Write>(mut inner: W, receiver: Receiver<Message>) {
    for message in receiver {
        match message {
            Message::Data(buf, None) => {
                let _ = inner.write_all(&buf);
            }
            Message::Data(buf, Some(ack)) => {
                let result = inner.write_all(&buf).and_then(|_| inner.flush());
                let _ = ack.send(result);
            }
            Message::Flush(ack) => {
                let _ = ack.send(inner.flush());
            }
        }
    }
    let _ = inner.flush();
}

fn worker_gone() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "async writer worker has stopped")
}
