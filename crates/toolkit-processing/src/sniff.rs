//! Content sniffing
//!
//! The true type of an uploaded file comes from its leading bytes, never from the
//! `Content-Type` the client attached to the part. [`ReplayReader`] buffers that leading
//! window and hands it back out ahead of the rest of the stream, so the sniffed bytes are
//! still written to disk.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const TEXT_XML: &str = "text/xml; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

const HTML_PREFIXES: &[&[u8]] = &[
    b"<!doctype html",
    b"<html",
    b"<head",
    b"<script",
    b"<iframe",
    b"<body",
    b"<title",
    b"<style",
    b"<table",
    b"<div",
    b"<a",
    b"<p",
    b"<br",
    b"<h1",
    b"<!--",
];

/// Reader that replays a pre-read window before continuing with the inner reader.
pub struct ReplayReader<R> {
    window: Vec<u8>,
    pos: usize,
    inner: R,
}

impl<R: AsyncRead + Unpin> ReplayReader<R> {
    /// Read up to `len` bytes from `inner` into the replay window.
    ///
    /// Stops early at EOF, so the window is shorter than `len` for short streams.
    pub async fn fill(mut inner: R, len: usize) -> io::Result<Self> {
        let mut window = vec![0u8; len];
        let mut filled = 0;

        while filled < len {
            let n = inner.read(&mut window[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        window.truncate(filled);

        Ok(Self {
            window,
            pos: 0,
            inner,
        })
    }

    /// The leading bytes read by [`ReplayReader::fill`].
    pub fn window(&self) -> &[u8] {
        &self.window
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ReplayReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if this.pos < this.window.len() {
            let remaining = &this.window[this.pos..];
            let n = remaining.len().min(buf.remaining());
            buf.put_slice(&remaining[..n]);
            this.pos += n;
            return Poll::Ready(Ok(()));
        }

        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

/// Detect the MIME type of a file from its leading bytes.
///
/// Magic-byte signatures come first. Without a match, markup is reported as HTML/XML,
/// content free of binary control bytes as plain text, and anything else as
/// `application/octet-stream`.
pub fn detect_content_type(window: &[u8]) -> String {
    if let Some(kind) = infer::get(window) {
        return kind.mime_type().to_string();
    }

    let trimmed = trim_leading_whitespace(window);
    if HTML_PREFIXES.iter().any(|p| starts_with_tag(trimmed, p)) {
        return TEXT_HTML.to_string();
    }
    if trimmed.starts_with(b"<?xml") {
        return TEXT_XML.to_string();
    }

    if window.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM.to_string()
    } else {
        TEXT_PLAIN.to_string()
    }
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | 0x0c | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

/// Case-insensitive tag prefix match that requires the tag to end right after the prefix.
fn starts_with_tag(data: &[u8], prefix: &[u8]) -> bool {
    if data.len() <= prefix.len() {
        return false;
    }
    if !data[..prefix.len()].eq_ignore_ascii_case(prefix) {
        return false;
    }
    prefix == b"<!--" || matches!(data[prefix.len()], b' ' | b'>')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}
