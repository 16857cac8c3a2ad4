use super::Io;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, Lines};
use tracing::instrument;

/// An [`Io`] interface over a pair of byte streams.
#[derive(Debug)]
pub struct Pipe<W: AsyncWrite, R: AsyncRead> {
    writer: BufWriter<W>,
    reader: Lines<BufReader<R>>,
}

impl<W: AsyncWrite, R: AsyncRead> Pipe<W, R> {
    pub fn new(writer: W, reader: R) -> Self {
        Pipe {
            writer: BufWriter::new(writer),
            reader: BufReader::new(reader).lines(),
        }
    }
}

impl<W: AsyncWrite, R: AsyncRead> From<(W, R)> for Pipe<W, R> {
    fn from((writer, reader): (W, R)) -> Self {
        Pipe::new(writer, reader)
    }
}

#[async_trait]
impl<W: AsyncWrite + Send + Unpin, R: AsyncRead + Send + Unpin> Io for Pipe<W, R> {
    #[instrument(level = "trace", skip(self), ret, err)]
    async fn recv(&mut self) -> io::Result<String> {
        match self.reader.next_line().await? {
            None => Err(io::ErrorKind::UnexpectedEof.into()),
            Some(mut line) => {
                if line.ends_with('\r') {
                    line.pop();
                }

                Ok(line)
            }
        }
    }

    #[instrument(level = "trace", skip(self), err)]
    async fn send(&mut self, msg: &str) -> io::Result<()> {
        self.writer.write_all(msg.as_bytes()).await?;
        self.writer.write_all(b"\n").await
    }

    #[instrument(level = "trace", skip(self), err)]
    async fn flush(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str;
    use test_strategy::proptest;
    use tokio::io::{duplex, empty, sink, AsyncReadExt};
    use tokio::runtime;

    #[proptest]
    fn recv_reads_one_line_at_a_time(#[strategy("[^\r\n]*")] a: String, #[strategy("[^\r\n]*")] b: String) {
        let rt = runtime::Builder::new_multi_thread().build()?;
        let input = format!("{a}\n{b}\r\n");
        let mut pipe = Pipe::new(sink(), input.as_bytes());
        assert_eq!(rt.block_on(pipe.recv())?, a);
        assert_eq!(rt.block_on(pipe.recv())?, b);
    }

    #[proptest]
    fn recv_fails_at_end_of_stream() {
        let rt = runtime::Builder::new_multi_thread().build()?;
        let mut pipe = Pipe::new(sink(), empty());
        let kind = rt.block_on(pipe.recv()).map_err(|e| e.kind());
        assert_eq!(kind, Err(io::ErrorKind::UnexpectedEof));
    }

    #[proptest]
    fn send_is_buffered_until_flushed(s: String) {
        let rt = runtime::Builder::new_multi_thread().build()?;

        let (writer, mut rx) = duplex(s.len() + 1);
        let mut pipe = Pipe::new(writer, empty());

        rt.block_on(pipe.send(&s))?;
        rt.block_on(pipe.flush())?;
        drop(pipe);

        let mut buf = String::new();
        rt.block_on(rx.read_to_string(&mut buf))?;
        assert_eq!(buf, format!("{s}\n"));
    }
}
