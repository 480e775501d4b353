//! Helpers for driving widgets from a byte script.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;

use crate::core::term::{Detached, Terminal, WidthSource};

/// Output sink that can be inspected after the terminal took ownership.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An 80 column terminal reading `input` and recording its output.
pub fn scripted(input: &[u8]) -> (Terminal, SharedBuffer) {
    let out = SharedBuffer::default();
    let term = Terminal::new(
        Box::new(io::Cursor::new(input.to_vec())),
        Box::new(out.clone()),
        Box::new(Detached),
    )
    .with_width(WidthSource::Fixed(80));
    (term, out)
}

/// Input delivered one chunk per read, so a lone ESC arrives by itself.
struct Chunks(VecDeque<Vec<u8>>);

impl Read for Chunks {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.0.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.0.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

/// Like [`scripted`], one read per chunk.
pub fn scripted_chunks(chunks: &[&[u8]]) -> (Terminal, SharedBuffer) {
    let out = SharedBuffer::default();
    let input = Chunks(chunks.iter().map(|c| c.to_vec()).collect());
    let term = Terminal::new(Box::new(input), Box::new(out.clone()), Box::new(Detached))
        .with_width(WidthSource::Fixed(80));
    (term, out)
}
