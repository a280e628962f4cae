//! JSON-lines transport: one message per line

use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use super::{MessageSink, MessageSource, TransportError};

/// Lines are returned as raw bytes; decoding (and rejecting bad UTF-8) is the
/// message parser's job.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }
}

impl LineSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> MessageSource for LineSource<R> {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            self.buf.clear();
            let read = self.reader.read_until(b'\n', &mut self.buf).await?;
            if read == 0 {
                return Ok(None);
            }
            let line = self.buf.trim_ascii();
            if !line.is_empty() {
                return Ok(Some(line.to_vec()));
            }
        }
    }
}

pub struct LineSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl LineSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> MessageSink for LineSink<W> {
    async fn publish(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(payload).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.writer.flush().await?;
        Ok(())
    }
}
