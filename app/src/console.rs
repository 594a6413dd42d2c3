use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Mutex;
use std::thread;

use lazy_static::lazy_static;

fn spawn_stdin_channel() -> Receiver<String> {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || loop {
        let mut buffer = String::new();
        match io::stdin().read_line(&mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if tx.send(buffer).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

lazy_static! {
    pub static ref NONBLOCKING_STDIN: Mutex<Receiver<String>> = Mutex::new(spawn_stdin_channel());
}

/// Next complete line typed on stdin, if any. Never blocks.
pub fn poll_line() -> Option<String> {
    let stdin = NONBLOCKING_STDIN.lock().ok()?;
    match stdin.try_recv() {
        Ok(line) => Some(line),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
    }
}

/// Recently entered command lines, oldest first.
#[derive(Clone, Debug, Default)]
pub struct History {
    lines: VecDeque<String>,
}

impl History {
    pub const CAPACITY: usize = 8;

    pub fn new() -> History {
        History::default()
    }

    pub fn push(&mut self, line: &str) {
        if self.lines.len() == History::CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line.trim_end().to_string());
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
